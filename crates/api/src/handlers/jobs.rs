//! Handlers for the meal-plan job resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Ownership is
//! checked on every job lookup before any state change.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mealsmith_core::error::CoreError;
use mealsmith_core::request::MealPlanRequest;
use mealsmith_core::types::Timestamp;
use mealsmith_db::models::job::{Job, JOB_TYPE_MEAL_PLAN};
use mealsmith_db::models::status::JobStatus;
use mealsmith_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// Status-conditional view of one job.
///
/// `result` is populated iff the job completed, `error` iff it failed, and
/// `processing_started_at` iff it is currently processing. Identifier,
/// status, and creation time are always present.
#[derive(Debug, Serialize)]
pub struct JobStatusView {
    pub job_id: Uuid,
    pub status: &'static str,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_started_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusView {
    fn from_job(job: Job) -> AppResult<Self> {
        let status = JobStatus::from_id(job.status_id).ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "job {} has unknown status id {}",
                job.id, job.status_id
            )))
        })?;

        Ok(Self {
            job_id: job.id,
            status: status.as_str(),
            created_at: job.created_at,
            processing_started_at: (status == JobStatus::Processing)
                .then_some(job.processing_started_at)
                .flatten(),
            completed_at: (status == JobStatus::Completed)
                .then_some(job.completed_at)
                .flatten(),
            result: (status == JobStatus::Completed).then_some(job.result).flatten(),
            error: (status == JobStatus::Failed)
                .then_some(job.error_message)
                .flatten(),
        })
    }
}

/// Response body for job submission.
#[derive(Debug, Serialize)]
pub struct SubmittedJob {
    pub job_id: Uuid,
    pub status: &'static str,
}

/// Recovered-result payload; `None` serializes as `{"data": null}`.
#[derive(Debug, Serialize)]
pub struct RecoveredJob {
    pub job_id: Uuid,
    pub result: Option<serde_json::Value>,
    pub completed_at: Option<Timestamp>,
}

/// Query parameters for `GET /meal-plans/jobs/recent`.
#[derive(Debug, Deserialize)]
pub struct RecoverQuery {
    /// Only consider jobs completed at or after this instant.
    pub since: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a job id path segment, failing fast with a validation error (not a
/// lookup) on malformed input.
fn parse_job_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::Core(CoreError::Validation(format!("malformed job id: {raw}")))
    })
}

/// Fetch a job by ID and verify the caller owns it.
///
/// Returns `NotFound` if the job does not exist, `Forbidden` if the caller
/// is not the owner. `action` is used in the error message (e.g. "view",
/// "cancel").
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: Uuid,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id.to_string(),
        })
    })?;

    if job.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another user's job"
        ))));
    }

    Ok(job)
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/meal-plans/jobs
///
/// Submit a new meal-plan generation job. Returns 201 with the job id; the
/// job starts in `pending` status and is picked up by the worker.
pub async fn submit_meal_plan_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<MealPlanRequest>,
) -> AppResult<impl IntoResponse> {
    request.validate()?;

    let params = serde_json::to_value(&request)
        .map_err(|e| AppError::Core(CoreError::Internal(e.to_string())))?;
    let job = JobRepo::submit(&state.pool, auth.user_id, JOB_TYPE_MEAL_PLAN, &params).await?;

    tracing::info!(
        job_id = %job.id,
        user_id = auth.user_id,
        days = request.days,
        meals_per_day = request.meals_per_day,
        "Meal-plan job submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedJob {
                job_id: job.id,
                status: JobStatus::Pending.as_str(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/meal-plans/jobs/{id}
///
/// Get the status of one job. The id is validated before any lookup; users
/// can only view their own jobs.
pub async fn get_job_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job_id = parse_job_id(&raw_id)?;
    let job = find_and_authorize(&state.pool, job_id, &auth, "view").await?;
    Ok(Json(DataResponse {
        data: JobStatusView::from_job(job)?,
    }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/meal-plans/jobs/{id}/cancel
///
/// Cancel a pending or processing job. Returns 200 on success, 409 if the
/// job is already in a terminal state. Cancellation does not interrupt an
/// in-flight generation; the worker's late write lands as a no-op.
pub async fn cancel_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job_id = parse_job_id(&raw_id)?;
    find_and_authorize(&state.pool, job_id, &auth, "cancel").await?;

    let cancelled = JobRepo::cancel(&state.pool, job_id).await?;
    if !cancelled {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is already in a terminal state and cannot be cancelled".into(),
        )));
    }

    tracing::info!(job_id = %job_id, user_id = auth.user_id, "Job cancelled");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "cancelled": true }),
    }))
}

// ---------------------------------------------------------------------------
// Recover
// ---------------------------------------------------------------------------

/// GET /api/v1/meal-plans/jobs/recent
///
/// Return the caller's most recently completed job, optionally bounded by
/// `?since=`. Used when a client lost its job id (e.g. page reload) and
/// needs the result that finished while it was disconnected. No qualifying
/// job is the expected common outcome and yields `{"data": null}`, not an
/// error.
pub async fn recover_recent_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RecoverQuery>,
) -> AppResult<impl IntoResponse> {
    let recovered = JobRepo::recover_recent(&state.pool, auth.user_id, query.since)
        .await?
        .map(|job| RecoveredJob {
            job_id: job.id,
            result: job.result,
            completed_at: job.completed_at,
        });

    Ok(Json(DataResponse { data: recovered }))
}
