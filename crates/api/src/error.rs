use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use mealsmith_core::error::CoreError;
use mealsmith_core::parse::ParseError;
use mealsmith_llm::GenerationError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `mealsmith_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A terminal provider failure from the generation call layer.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The provider responded but not with a valid domain object.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The synchronous generation path exceeded its deadline.
    #[error("Generation deadline exceeded")]
    GenerationTimeout,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Provider / generation errors ---
            AppError::Generation(err) => classify_generation_error(err),

            AppError::Parse(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "GENERATION_UNPARSEABLE",
                err.to_string(),
            ),

            AppError::GenerationTimeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Generation service temporarily unavailable".to_string(),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// Storage failures are internal/500 and never conflated with domain
/// outcomes; the message is sanitized.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Map a terminal generation failure onto the synchronous path's contract:
/// missing configuration -> 503, quota/rate-limit -> 429, everything else
/// (including exhausted transient retries) -> 500.
fn classify_generation_error(err: &GenerationError) -> (StatusCode, &'static str, String) {
    match err {
        GenerationError::NotConfigured(msg) => {
            tracing::error!(error = %msg, "Generation provider not configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Generation service is not available".to_string(),
            )
        }
        GenerationError::Fatal(msg) if is_rate_limit(msg) => (
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "Generation provider rate limit reached, try again later".to_string(),
        ),
        GenerationError::RetriesExhausted { last_cause, .. } if is_rate_limit(last_cause) => (
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "Generation provider rate limit reached, try again later".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                "Recipe generation failed".to_string(),
            )
        }
    }
}

fn is_rate_limit(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("429") || lowered.contains("rate limit") || lowered.contains("too many requests")
}
