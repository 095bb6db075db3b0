//! Route definitions for the meal-plan job resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/meal-plans/jobs`.
///
/// ```text
/// POST   /                -> submit_meal_plan_job
/// GET    /recent          -> recover_recent_job
/// GET    /{id}            -> get_job_status
/// POST   /{id}/cancel     -> cancel_job
/// ```
///
/// `/recent` is registered as a static segment; axum gives it precedence
/// over the `/{id}` capture.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(jobs::submit_meal_plan_job))
        .route("/recent", get(jobs::recover_recent_job))
        .route("/{id}", get(jobs::get_job_status))
        .route("/{id}/cancel", post(jobs::cancel_job))
}
