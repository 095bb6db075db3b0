//! Synchronous single-recipe generation.

use std::time::Duration;

use axum::extract::State;
use axum::Json;

use mealsmith_core::parse::parse_recipe;
use mealsmith_core::prompt::build_recipe_prompt;
use mealsmith_core::recipe::Recipe;
use mealsmith_core::request::GenerationRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/recipes/generate
///
/// Generate a single recipe within the request, blocking the caller until
/// the provider responds. The call is bounded by a deadline shorter than the
/// outer request timeout; hitting it yields a 503 rather than a dropped
/// connection. Retry behavior inside the deadline is the client's normal
/// policy.
pub async fn generate_recipe(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> AppResult<Json<DataResponse<Recipe>>> {
    request.validate()?;

    let prompt = build_recipe_prompt(&request);
    let deadline = Duration::from_secs(state.config.generation_deadline_secs);

    let raw = match tokio::time::timeout(deadline, state.generator.generate(&prompt)).await {
        Err(_elapsed) => {
            tracing::warn!(
                user_id = auth.user_id,
                deadline_secs = deadline.as_secs(),
                "Synchronous recipe generation exceeded deadline",
            );
            return Err(AppError::GenerationTimeout);
        }
        Ok(result) => result?,
    };

    let recipe = parse_recipe(&raw)?;

    tracing::info!(
        user_id = auth.user_id,
        recipe_name = %recipe.name,
        "Recipe generated",
    );

    Ok(Json(DataResponse { data: recipe }))
}
