use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use outreach_core_health_contracts::{HealthFeatureService, HealthStatus};
use serde::Serialize;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    http: bool,
    cache: bool,
    email: bool,
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let status = service.get_status().await;
    let HealthStatus { cache, email } = status;

    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let response = HealthResponse {
        http: true,
        cache,
        email,
    };

    (code, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use outreach_core_contact_contracts::MockContactService;
    use outreach_core_health_contracts::MockHealthFeatureService;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::tests::{body_json, server};

    #[tokio::test]
    async fn healthy() {
        // Arrange
        let health = MockHealthFeatureService::new().with_get_status(HealthStatus {
            cache: true,
            email: true,
        });
        let router = server(health, MockContactService::new(), None).router();

        // Act
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"http": true, "cache": true, "email": true})
        );
    }

    #[tokio::test]
    async fn email_down() {
        // Arrange
        let health = MockHealthFeatureService::new().with_get_status(HealthStatus {
            cache: true,
            email: false,
        });
        let router = server(health, MockContactService::new(), None).router();

        // Act
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"http": true, "cache": true, "email": false})
        );
    }
}
