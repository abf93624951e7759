use std::fmt::Display;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
    Form,
};
use tracing::debug;

use crate::{models::contact::ApiContactForm, routes::error};

/// Contact form fields, sent either url-encoded or as `multipart/form-data`.
pub struct ContactForm(pub ApiContactForm);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for ContactForm {
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|x| x.to_str().ok())
            .is_some_and(|x| x.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(invalid_form)?;
            read_multipart(multipart).await.map(Self).map_err(invalid_form)
        } else {
            let Form(form) = Form::<ApiContactForm>::from_request(request, state)
                .await
                .map_err(invalid_form)?;
            Ok(Self(form))
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<ApiContactForm, axum::extract::multipart::MultipartError> {
    let mut form = ApiContactForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await?;
        form.set(&name, value);
    }
    Ok(form)
}

fn invalid_form(err: impl Display) -> Response {
    debug!("rejecting contact form body: {err}");
    error(StatusCode::BAD_REQUEST, "Invalid form data")
}
