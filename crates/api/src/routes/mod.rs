pub mod health;
pub mod jobs;
pub mod recipes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /meal-plans/jobs                 submit job (POST)
/// /meal-plans/jobs/recent          recover most recent completed job (GET)
/// /meal-plans/jobs/{id}            job status (GET)
/// /meal-plans/jobs/{id}/cancel     cancel job (POST)
///
/// /recipes/generate                synchronous single-recipe generation (POST)
/// ```
///
/// All endpoints require authentication. `/health` is mounted separately at
/// the root, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/meal-plans/jobs", jobs::router())
        .nest("/recipes", recipes::router())
}
