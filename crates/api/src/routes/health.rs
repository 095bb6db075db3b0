//! Root-level liveness endpoint, mounted outside `/api/v1` and outside auth.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /health
///
/// Reports `ok` when the database answers a trivial query, `degraded`
/// otherwise. Always returns 200 so load balancers can distinguish
/// degradation from process death.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match mealsmith_db::health_check(&state.pool).await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Database health probe failed");
            "down"
        }
    };

    Json(HealthStatus {
        status: if database == "up" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
