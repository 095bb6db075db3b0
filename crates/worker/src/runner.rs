//! Job runner loop: claim pending jobs, generate, write back.
//!
//! One claimed job runs at a time per runner instance; claim exclusivity
//! comes from the storage layer's conditional update, so any number of
//! runner processes can poll the same queue. Final writes are guarded on the
//! job still being `processing`; a job cancelled mid-generation turns the
//! write-back into a logged no-op.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use mealsmith_core::parse;
use mealsmith_core::prompt;
use mealsmith_core::recipe::MealPlanResult;
use mealsmith_core::request::MealPlanRequest;
use mealsmith_db::models::job::{Job, JOB_TYPE_MEAL_PLAN};
use mealsmith_db::repositories::JobRepo;
use mealsmith_llm::GenerationClient;

/// Default polling interval for the runner loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default lease on a `processing` claim before the sweep returns it to
/// `pending`.
const DEFAULT_LEASE_SECS: i64 = 600;

/// How many poll ticks pass between stale-claim sweeps.
const RECLAIM_EVERY_TICKS: u32 = 60;

/// Runner tuning knobs.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    /// Seconds a job may sit in `processing` before being reclaimed.
    pub lease_secs: i64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            lease_secs: DEFAULT_LEASE_SECS,
        }
    }
}

impl RunnerConfig {
    /// Load runner configuration from environment variables.
    ///
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `WORKER_POLL_MS`     | `1000`  |
    /// | `WORKER_LEASE_SECS`  | `600`   |
    pub fn from_env() -> Self {
        let poll_ms: u64 = std::env::var("WORKER_POLL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("WORKER_POLL_MS must be a valid u64");
        let lease_secs: i64 = std::env::var("WORKER_LEASE_SECS")
            .unwrap_or_else(|_| DEFAULT_LEASE_SECS.to_string())
            .parse()
            .expect("WORKER_LEASE_SECS must be a valid i64");
        Self {
            poll_interval: Duration::from_millis(poll_ms),
            lease_secs,
        }
    }
}

/// Long-lived task that drains the pending job queue.
pub struct JobRunner {
    pool: PgPool,
    generator: GenerationClient,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(pool: PgPool, generator: GenerationClient, config: RunnerConfig) -> Self {
        Self {
            pool,
            generator,
            config,
        }
    }

    /// Run the claim/process loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        let mut ticks: u32 = 0;
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            lease_secs = self.config.lease_secs,
            "Job runner started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    ticks = ticks.wrapping_add(1);
                    if ticks % RECLAIM_EVERY_TICKS == 0 {
                        self.sweep_stale_claims().await;
                    }
                    if let Err(e) = self.try_run_one().await {
                        tracing::error!(error = %e, "Runner cycle failed");
                    }
                }
            }
        }
    }

    /// One cycle: claim the oldest pending job, if any, and process it to a
    /// terminal outcome.
    pub async fn try_run_one(&self) -> Result<bool, sqlx::Error> {
        let Some(job) = JobRepo::claim_next(&self.pool).await? else {
            return Ok(false);
        };

        tracing::info!(
            job_id = %job.id,
            job_type = %job.job_type,
            user_id = job.user_id,
            "Job claimed",
        );

        match self.process(&job).await {
            Ok(result) => {
                let written = JobRepo::complete(&self.pool, job.id, &result).await?;
                if written {
                    tracing::info!(job_id = %job.id, "Job completed");
                } else {
                    // Cancelled while we were generating; the result is dropped.
                    tracing::info!(job_id = %job.id, "Job no longer processing, result discarded");
                }
            }
            Err(message) => {
                let written = JobRepo::fail(&self.pool, job.id, &message).await?;
                if written {
                    tracing::warn!(job_id = %job.id, error = %message, "Job failed");
                } else {
                    tracing::info!(job_id = %job.id, "Job no longer processing, failure discarded");
                }
            }
        }

        Ok(true)
    }

    /// Run one job's generation pipeline. The error string becomes the job's
    /// persisted `error_message`.
    async fn process(&self, job: &Job) -> Result<serde_json::Value, String> {
        match job.job_type.as_str() {
            JOB_TYPE_MEAL_PLAN => self.process_meal_plan(job).await,
            other => Err(format!("unknown job type: {other}")),
        }
    }

    async fn process_meal_plan(&self, job: &Job) -> Result<serde_json::Value, String> {
        let request: MealPlanRequest = serde_json::from_value(job.params.clone())
            .map_err(|e| format!("invalid job parameters: {e}"))?;

        let prompt = prompt::build_meal_plan_prompt(&request);

        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| e.to_string())?;

        let payload = parse::parse_meal_plan(&raw).map_err(|e| match e {
            parse::ParseError::MalformedOutput { detail, raw } => {
                // Keep the raw text in the log for diagnostics; the stored
                // error stays concise.
                tracing::warn!(job_id = %job.id, raw = %raw, "Provider returned malformed output");
                format!("malformed output: {detail}")
            }
            other => other.to_string(),
        })?;

        // The echoed dimensions must describe what was actually generated.
        if payload.day_plans.len() != request.days as usize {
            return Err(format!(
                "plan has {} days, requested {}",
                payload.day_plans.len(),
                request.days
            ));
        }
        for day in &payload.day_plans {
            if day.meals.len() != request.meals_per_day as usize {
                return Err(format!(
                    "day {} has {} meals, requested {}",
                    day.day,
                    day.meals.len(),
                    request.meals_per_day
                ));
            }
        }

        let result = MealPlanResult::from_payload(
            payload,
            request.days,
            request.meals_per_day,
            request.people,
        );

        serde_json::to_value(&result).map_err(|e| format!("failed to encode result: {e}"))
    }

    async fn sweep_stale_claims(&self) {
        match JobRepo::reclaim_stale(&self.pool, self.config.lease_secs).await {
            Ok(0) => {}
            Ok(count) => tracing::warn!(count, "Reclaimed stale processing jobs"),
            Err(e) => tracing::error!(error = %e, "Stale-claim sweep failed"),
        }
    }
}
