//! HTTP-level integration tests for synchronous recipe generation.
//!
//! The generation client is backed by a scripted fake provider, so each test
//! controls exactly what the "model" returns.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{bearer_token, body_json, build_test_app_with_provider, post_json};
use serde_json::json;
use sqlx::PgPool;

use mealsmith_llm::{FakeProvider, LlmError};

const USER: i64 = 7;

fn recipe_request() -> serde_json::Value {
    json!({
        "ingredients": ["chicken breast", "rice", "broccoli"],
        "dietary_restrictions": [],
        "allergies": ["peanuts"],
        "max_cooking_time_minutes": 30,
        "servings": 2,
        "meal_type": "dinner",
    })
}

fn valid_recipe_json() -> String {
    json!({
        "name": "Chicken and Broccoli Rice Bowl",
        "description": "A quick weeknight bowl.",
        "cooking_time_minutes": 25,
        "servings": 2,
        "difficulty": "easy",
        "cuisine": "American",
        "meal_type": "dinner",
        "ingredients": [
            {"name": "chicken breast", "amount": "300", "unit": "g"},
            {"name": "rice", "amount": "200", "unit": "g"},
            {"name": "broccoli", "amount": "150", "unit": "g"},
        ],
        "instructions": [
            {"step": 1, "text": "Cook the rice.", "duration_minutes": 15},
            {"step": 2, "text": "Pan-fry the chicken and steam the broccoli.", "duration_minutes": 10},
        ],
        "nutrition": {
            "calories": 520.0,
            "protein_g": 42.0,
            "carbs_g": 55.0,
            "fats_g": 12.0,
        },
    })
    .to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_success(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Ok(valid_recipe_json()));

    let app = build_test_app_with_provider(pool, provider.clone());
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Chicken and Broccoli Rice Bowl");
    assert_eq!(json["data"]["instructions"][0]["step"], 1);
    assert_eq!(provider.calls(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_strips_code_fences(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Ok(format!("```json\n{}\n```", valid_recipe_json())));

    let app = build_test_app_with_provider(pool, provider);
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_empty_ingredients_rejected(pool: PgPool) {
    let app = build_test_app_with_provider(pool, Arc::new(FakeProvider::default()));
    let mut body = recipe_request();
    body["ingredients"] = json!([]);

    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_unparseable_output_is_422(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Ok("Sure! Here's a recipe idea for you:".to_string()));

    let app = build_test_app_with_provider(pool, provider);
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_UNPARSEABLE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_not_configured_is_503(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Err(LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into())));

    let app = build_test_app_with_provider(pool, provider);
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_rate_limited_is_429(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Err(LlmError::ApiError {
        status: 429,
        message: "rate limit exceeded".into(),
    }));

    let app = build_test_app_with_provider(pool, provider);
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_recipe_provider_failure_is_500(pool: PgPool) {
    let provider = Arc::new(FakeProvider::default());
    provider.push(Err(LlmError::ApiError {
        status: 401,
        message: "invalid api key".into(),
    }));

    let app = build_test_app_with_provider(pool, provider);
    let response = post_json(app, "/api/v1/recipes/generate", &bearer_token(USER), recipe_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
}
