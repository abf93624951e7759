use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::X_CONTENT_TYPE_OPTIONS, HeaderValue, StatusCode},
    response::Response,
    routing::{self, MethodRouter},
    Extension, Router,
};
use outreach_core_contact_contracts::{ContactService, ContactSubmitError};
use outreach_models::contact::ContactRequestMetadata;
use tower_http::set_header::SetResponseHeaderLayer;

use super::{error, internal_server_error, success};
use crate::{
    extractors::{contact_form::ContactForm, user_agent::UserAgent},
    middlewares::client_ip::ClientIp,
};

pub fn router<S: ContactService>(service: Arc<S>) -> Router<()> {
    Router::new()
        .route("/server/send-contact", submit_route::<S>())
        // path used by the static website
        .route("/server/send-contact.php", submit_route::<S>())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(service)
}

fn submit_route<S: ContactService>() -> MethodRouter<Arc<S>> {
    routing::post(submit::<S>).fallback(method_not_allowed)
}

async fn submit<S: ContactService>(
    service: State<Arc<S>>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    UserAgent(user_agent): UserAgent,
    ContactForm(form): ContactForm,
) -> Response {
    let meta = ContactRequestMetadata {
        client_ip,
        user_agent,
    };

    match service.submit(form.into(), meta).await {
        Ok(()) => success("Message sent successfully"),
        Err(ContactSubmitError::Validation(err)) => error(StatusCode::BAD_REQUEST, err.to_string()),
        Err(err @ ContactSubmitError::RateLimited) => {
            error(StatusCode::TOO_MANY_REQUESTS, err.to_string())
        }
        Err(err @ ContactSubmitError::Send) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(ContactSubmitError::Other(err)) => internal_server_error(err),
    }
}

async fn method_not_allowed() -> Response {
    error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
