use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::config;
use super::health;
use super::readings;
use super::state::AppState;

/// Create a minimal router without state
/// Note: /ready endpoint is not available without state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/config", get(config::dump_configuration))
        .merge(auth::create_auth_router())
        .merge(readings::create_readings_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::SESSION_HEADER;
    use crate::config::AppConfig;
    use crate::domain::storage::MockStorage;
    use crate::domain::DomainError;
    use crate::infrastructure::storage::InMemoryStorage;

    fn app_with(config: AppConfig) -> Router {
        let state = AppState::new(Arc::new(InMemoryStorage::new()), config);
        create_router_with_state(state)
    }

    fn app() -> Router {
        app_with(AppConfig::default())
    }

    fn json_request(method: Method, uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: Method, uri: &str, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/login",
                None,
                json!({ "identity_url": "http://me.example.com", "nickname": "me" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["user"]["display_name"], "me");
        body["session_key"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = create_router()
            .oneshot(empty_request(Method::GET, "/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_check_with_memory_storage() {
        let response = app()
            .oneshot(empty_request(Method::GET, "/ready", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["storage"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_check_reports_storage_failure() {
        let mut storage = MockStorage::new();
        storage
            .expect_retrieve()
            .returning(|_, _, _| Err(DomainError::storage("connection refused")));
        let app = create_router_with_state(AppState::new(Arc::new(storage), AppConfig::default()));

        let response = app
            .oneshot(empty_request(Method::GET, "/ready", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_readings_require_session() {
        let response = app()
            .oneshot(empty_request(Method::GET, "/readings", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let response = app()
            .oneshot(empty_request(Method::GET, "/readings", Some("nope")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_list_and_remove_reading() {
        let app = app();
        let session = login(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/readings",
                Some(&session),
                json!({ "title": "<Title>", "link": "http://example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["title"], "<Title>");
        assert!(created["when"].as_str().unwrap().ends_with('Z'));
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, "/readings", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed["readings"].as_array().unwrap().len(), 1);
        assert_eq!(listed["readings"][0]["id"], id.as_str());

        let uri = format!("/readings/{}", id);
        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &uri, Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request(Method::DELETE, &uri, Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_reading_validation() {
        let app = app();
        let session = login(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/readings",
                Some(&session),
                json!({ "title": "", "link": "http://example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/readings",
                Some(&session),
                json!({ "title": "<Title>" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = app();
        let session = login(&app).await;

        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, "/logout", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request(Method::GET, "/me", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_current_user() {
        let app = app();
        let session = login(&app).await;

        let response = app
            .oneshot(empty_request(Method::GET, "/me", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["open_id"], "http://me.example.com");
    }

    #[tokio::test]
    async fn test_config_forbidden_without_debug() {
        let response = app()
            .oneshot(empty_request(Method::GET, "/config", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"]["type"], "permission_error");
    }

    #[tokio::test]
    async fn test_config_in_debug_mode() {
        let mut config = AppConfig::default();
        config.server.debug = true;

        let response = app_with(config)
            .oneshot(empty_request(Method::GET, "/config", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["server"]["port"], 5000);
        assert_eq!(body["storage"]["backend"], "memory");
    }
}
