//! Route definitions for the `/recipes` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::recipes;
use crate::state::AppState;

/// Routes mounted at `/recipes`.
///
/// ```text
/// POST   /generate        -> generate_recipe
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(recipes::generate_recipe))
}
