//! End-to-end runner tests: submitted job -> claimed -> provider -> result.

use std::sync::Arc;

use sqlx::PgPool;

use mealsmith_core::recipe::MealPlanResult;
use mealsmith_db::models::job::JOB_TYPE_MEAL_PLAN;
use mealsmith_db::models::status::JobStatus;
use mealsmith_db::repositories::JobRepo;
use mealsmith_llm::fake::FakeProvider;
use mealsmith_llm::{GenerationClient, LlmError};
use mealsmith_worker::{JobRunner, RunnerConfig};

const USER: i64 = 7;

fn recipe_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": "Test dish.",
        "cooking_time_minutes": 20,
        "servings": 2,
        "difficulty": "easy",
        "cuisine": "italian",
        "meal_type": "dinner",
        "ingredients": [ { "name": "pasta", "amount": "200", "unit": "g" } ],
        "instructions": [ { "step": 1, "text": "Boil." }, { "step": 2, "text": "Serve." } ],
        "nutrition": { "calories": 500, "protein_g": 20, "carbs_g": 70, "fats_g": 12 }
    })
}

/// A well-formed provider response for a days x meals_per_day plan, wrapped
/// in a code fence the way models often answer despite instructions.
fn plan_response(days: u32, meals_per_day: u32) -> String {
    let day_plans: Vec<serde_json::Value> = (1..=days)
        .map(|day| {
            let meals: Vec<serde_json::Value> = (0..meals_per_day)
                .map(|meal| {
                    let meal_type =
                        ["breakfast", "lunch", "dinner", "snack", "supper"][meal as usize];
                    serde_json::json!({
                        "meal_type": meal_type,
                        "recipe": recipe_json(&format!("Day {day} meal {meal}"))
                    })
                })
                .collect();
            serde_json::json!({ "day": day, "meals": meals })
        })
        .collect();

    let plan = serde_json::json!({
        "name": "Test Plan",
        "total_estimated_cost": 62.0,
        "day_plans": day_plans,
        "shopping_list": [
            { "name": "pasta", "quantity": "1.8 kg", "category": "pantry", "estimated_cost": 9.0 }
        ]
    });

    format!("```json\n{plan}\n```")
}

fn runner_with(pool: PgPool, provider: FakeProvider) -> JobRunner {
    let generator = GenerationClient::with_default_policy(Arc::new(provider));
    JobRunner::new(pool, generator, RunnerConfig::default())
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completes_a_meal_plan_job_end_to_end(pool: PgPool) {
    let params = serde_json::json!({
        "days": 3, "meals_per_day": 3, "people": 2, "target_calories": 2000
    });
    let job = JobRepo::submit(&pool, USER, JOB_TYPE_MEAL_PLAN, &params)
        .await
        .unwrap();

    let fake = FakeProvider::new("unused");
    fake.push(Ok(plan_response(3, 3)));
    let runner = runner_with(pool.clone(), fake);

    assert!(runner.try_run_one().await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Completed.id());

    let result: MealPlanResult = serde_json::from_value(row.result.unwrap()).unwrap();
    assert_eq!(result.days, 3);
    assert_eq!(result.meals_per_day, 3);
    assert_eq!(result.people, 2);
    assert_eq!(result.day_plans.len(), 3);
    assert!(result.day_plans.iter().all(|day| day.meals.len() == 3));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn plan_with_wrong_dimensions_fails_the_job(pool: PgPool) {
    let params = serde_json::json!({
        "days": 3, "meals_per_day": 3, "people": 2, "target_calories": 2000
    });
    let job = JobRepo::submit(&pool, USER, JOB_TYPE_MEAL_PLAN, &params)
        .await
        .unwrap();

    // Well-formed plan, but only 2 of the requested 3 days.
    let fake = FakeProvider::new("unused");
    fake.push(Ok(plan_response(2, 3)));
    let runner = runner_with(pool.clone(), fake);

    assert!(runner.try_run_one().await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Failed.id());
    assert!(row.error_message.unwrap().contains("2 days"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_provider_output_fails_the_job(pool: PgPool) {
    let params = serde_json::json!({
        "days": 1, "meals_per_day": 2, "people": 1, "target_calories": 1500
    });
    let job = JobRepo::submit(&pool, USER, JOB_TYPE_MEAL_PLAN, &params)
        .await
        .unwrap();

    let fake = FakeProvider::new("this is not json");
    let runner = runner_with(pool.clone(), fake);

    assert!(runner.try_run_one().await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Failed.id());
    assert!(row.error_message.unwrap().contains("malformed output"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fatal_provider_error_fails_the_job_with_cause(pool: PgPool) {
    let params = serde_json::json!({
        "days": 1, "meals_per_day": 2, "people": 1, "target_calories": 1500
    });
    let job = JobRepo::submit(&pool, USER, JOB_TYPE_MEAL_PLAN, &params)
        .await
        .unwrap();

    let fake = FakeProvider::new("unused");
    fake.push(Err(LlmError::ApiError {
        status: 401,
        message: "invalid api key".into(),
    }));
    let runner = runner_with(pool.clone(), fake);

    assert!(runner.try_run_one().await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Failed.id());
    assert!(row.error_message.unwrap().contains("invalid api key"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_queue_is_an_idle_cycle(pool: PgPool) {
    let runner = runner_with(pool, FakeProvider::default());
    assert!(!runner.try_run_one().await.unwrap());
}
