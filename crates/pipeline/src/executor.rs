//! Drives one job through the stage pipeline.
//!
//! For every stage the checkpoint is written to the store first and the
//! stage work runs afterwards, so a poller sees `processing/10` while
//! ingest runs, `50` during transform and `90` during finalize. Completion is
//! a single update setting status, progress, `completed_at` and `result_url`.
//!
//! Nothing escapes [`JobExecutor::run`]: a stage error or a store error ends
//! the job in `failed` with the error text recorded on the job.

use std::sync::Arc;

use chrono::Utc;
use docflow_core::job::JobUpdate;
use docflow_core::types::JobId;
use docflow_store::{JobStore, StoreError};

use crate::stage::{JobContext, Stage, StageError, StageWork};

/// Why a job ended in `failed`.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionFailure {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("Job record update failed: {0}")]
    Store(#[from] StoreError),

    #[error("Job executor panicked: {0}")]
    Panicked(String),

    #[error("Job executor was aborted")]
    Aborted,
}

pub struct JobExecutor {
    store: Arc<JobStore>,
    work: Arc<dyn StageWork>,
}

impl JobExecutor {
    pub fn new(store: Arc<JobStore>, work: Arc<dyn StageWork>) -> Self {
        Self { store, work }
    }

    /// Run every stage for `ctx.job_id` and record the outcome.
    pub async fn run(&self, ctx: JobContext) {
        tracing::info!(
            job_id = %ctx.job_id,
            filename = %ctx.filename,
            "Starting job processing",
        );

        match self.run_stages(&ctx).await {
            Ok(()) => {
                tracing::info!(job_id = %ctx.job_id, "Job completed");
            }
            Err(failure) => self.record_failure(ctx.job_id, &failure).await,
        }
    }

    async fn run_stages(&self, ctx: &JobContext) -> Result<(), ExecutionFailure> {
        for stage in Stage::ALL {
            let update = if stage == Stage::Ingest {
                JobUpdate::processing(stage.checkpoint())
            } else {
                JobUpdate::new().with_progress(stage.checkpoint())
            };
            self.store.update(ctx.job_id, update).await?;

            tracing::debug!(
                job_id = %ctx.job_id,
                stage = %stage,
                progress = stage.checkpoint(),
                "Stage started",
            );

            self.work
                .run(stage, ctx)
                .await
                .map_err(|source| ExecutionFailure::Stage { stage, source })?;
        }

        self.store
            .update(ctx.job_id, JobUpdate::completed(ctx.job_id, Utc::now()))
            .await?;
        Ok(())
    }

    /// Move the job to `failed` with `failure` as its error.
    ///
    /// Errors while recording (record evicted, already terminal) are logged
    /// and dropped.
    pub async fn record_failure(&self, job_id: JobId, failure: &ExecutionFailure) {
        tracing::error!(job_id = %job_id, error = %failure, "Job failed");

        if let Err(e) = self
            .store
            .update(job_id, JobUpdate::failed(failure.to_string()))
            .await
        {
            tracing::error!(
                job_id = %job_id,
                error = %e,
                "Failed to record job failure",
            );
        }
    }
}
