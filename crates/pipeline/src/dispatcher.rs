//! Detached dispatch of job executors.
//!
//! Every dispatched job runs in its own Tokio task. A second, supervising
//! task awaits it so that a panic in stage work still ends the job in
//! `failed` instead of leaving it stuck in `processing`. Supervisors are
//! tracked by a [`TaskTracker`] so shutdown can wait for in-flight jobs.
//! There is no cancellation: a dispatched job runs until it completes or
//! fails.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use docflow_store::JobStore;
use tokio_util::task::TaskTracker;

use crate::executor::{ExecutionFailure, JobExecutor};
use crate::stage::{JobContext, StageWork};

#[derive(Clone)]
pub struct JobDispatcher {
    executor: Arc<JobExecutor>,
    tracker: TaskTracker,
}

impl JobDispatcher {
    pub fn new(store: Arc<JobStore>, work: Arc<dyn StageWork>) -> Self {
        Self {
            executor: Arc::new(JobExecutor::new(store, work)),
            tracker: TaskTracker::new(),
        }
    }

    /// Start processing `ctx` in the background and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, ctx: JobContext) {
        let job_id = ctx.job_id;

        let executor = Arc::clone(&self.executor);
        let run = tokio::spawn(async move { executor.run(ctx).await });

        let executor = Arc::clone(&self.executor);
        self.tracker.spawn(async move {
            let Err(join_err) = run.await else {
                return;
            };

            let failure = if join_err.is_panic() {
                ExecutionFailure::Panicked(panic_message(join_err.into_panic()))
            } else {
                ExecutionFailure::Aborted
            };
            executor.record_failure(job_id, &failure).await;
        });

        tracing::debug!(job_id = %job_id, in_flight = self.in_flight(), "Job dispatched");
    }

    /// Number of dispatched jobs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for in-flight jobs, up to `timeout`.
    ///
    /// Returns `true` if every job finished within `timeout`. Jobs still
    /// running afterwards are abandoned with the process.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let in_flight = self.in_flight();
        if in_flight > 0 {
            tracing::info!(in_flight, "Waiting for in-flight jobs to finish");
        }

        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        if !drained {
            tracing::warn!(
                in_flight = self.in_flight(),
                "Shutdown timeout reached with jobs still running",
            );
        }
        drained
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
