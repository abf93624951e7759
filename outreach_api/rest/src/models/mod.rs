use serde::Serialize;

pub mod contact;

/// Body of every json response of the contact endpoint, including errors.
#[derive(Debug, Serialize)]
pub struct ApiResult {
    pub success: bool,
    pub message: String,
}
