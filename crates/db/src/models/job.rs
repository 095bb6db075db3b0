//! Job entity model and DTOs for the generation job queue.

use mealsmith_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::status::StatusId;

/// Job type tag for multi-day meal-plan jobs.
pub const JOB_TYPE_MEAL_PLAN: &str = "meal_plan";

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: DbId,
    pub job_type: String,
    pub status_id: StatusId,
    /// The original request parameters, immutable once submitted.
    pub params: serde_json::Value,
    /// Present iff the job completed.
    pub result: Option<serde_json::Value>,
    /// Present iff the job failed.
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub processing_started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
