//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the full application router (same middleware stack as `main.rs`)
//! against a test database pool, with the generation client backed by a
//! scripted [`FakeProvider`] so no network traffic leaves the test.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use mealsmith_api::auth::jwt::{generate_access_token, JwtConfig};
use mealsmith_api::config::ServerConfig;
use mealsmith_api::routes;
use mealsmith_api::state::AppState;
use mealsmith_core::types::DbId;
use mealsmith_llm::{FakeProvider, GenerationClient, LlmProvider, RetryPolicy};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_deadline_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the application router backed by a scripted fake provider.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_provider(pool, Arc::new(FakeProvider::default()))
}

/// Build the full application router with all middleware layers, using the
/// given database pool and provider.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses. The retry policy is zeroed out so
/// scripted provider failures surface immediately instead of sleeping
/// through backoff delays.
pub fn build_test_app_with_provider(pool: PgPool, provider: Arc<dyn LlmProvider>) -> Router {
    let config = test_config();

    let no_retry = RetryPolicy {
        max_retries: 0,
        ..RetryPolicy::default()
    };

    let state = AppState {
        pool,
        config: Arc::new(config),
        generator: Arc::new(GenerationClient::new(provider, no_retry)),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Mint a bearer token for the given user, signed with the test secret.
pub fn bearer_token(user_id: DbId) -> String {
    bearer_token_with_role(user_id, "user")
}

pub fn bearer_token_with_role(user_id: DbId, role: &str) -> String {
    let token = generate_access_token(user_id, role, &test_config().jwt)
        .expect("token generation should not fail");
    format!("Bearer {token}")
}

/// Send an authenticated GET request.
pub async fn get(app: Router, uri: &str, auth: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send an unauthenticated GET request.
pub async fn get_anon(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send an authenticated POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, auth: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send an authenticated POST request with no body.
pub async fn post_empty(app: Router, uri: &str, auth: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and decode it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}
