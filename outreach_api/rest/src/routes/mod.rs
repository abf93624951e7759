use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResult;

pub mod contact;
pub mod health;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ApiResult {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

fn success(message: impl Into<String>) -> Response {
    Json(ApiResult {
        success: true,
        message: message.into(),
    })
    .into_response()
}
