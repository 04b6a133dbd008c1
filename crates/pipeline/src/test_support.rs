//! Stage work doubles shared by the executor and dispatcher tests.

use std::sync::Arc;

use async_trait::async_trait;
use docflow_core::job::JobStatus;
use docflow_store::JobStore;
use tokio::sync::Mutex;

use crate::stage::{JobContext, Stage, StageError, StageWork};

/// Records the job's status and progress as seen at the start of each stage.
pub struct RecordingWork {
    store: Arc<JobStore>,
    seen: Mutex<Vec<(Stage, JobStatus, u8)>>,
}

impl RecordingWork {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self {
            store,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn seen(&self) -> Vec<(Stage, JobStatus, u8)> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl StageWork for RecordingWork {
    async fn run(&self, stage: Stage, ctx: &JobContext) -> Result<(), StageError> {
        let record = self
            .store
            .get(ctx.job_id)
            .await
            .map_err(|e| StageError::Transform(e.to_string()))?;
        self.seen
            .lock()
            .await
            .push((stage, record.status, record.progress));
        Ok(())
    }
}

/// Fails with a transformation error at one stage.
pub struct FailingWork {
    stage: Stage,
}

impl FailingWork {
    pub fn at(stage: Stage) -> Self {
        Self { stage }
    }
}

#[async_trait]
impl StageWork for FailingWork {
    async fn run(&self, stage: Stage, _ctx: &JobContext) -> Result<(), StageError> {
        if stage == self.stage {
            return Err(StageError::Transform(format!("corrupt input in {stage}")));
        }
        Ok(())
    }
}

/// Panics at one stage.
pub struct PanickingWork {
    stage: Stage,
}

impl PanickingWork {
    pub fn at(stage: Stage) -> Self {
        Self { stage }
    }
}

#[async_trait]
impl StageWork for PanickingWork {
    async fn run(&self, stage: Stage, _ctx: &JobContext) -> Result<(), StageError> {
        if stage == self.stage {
            panic!("decoder blew up in {stage}");
        }
        Ok(())
    }
}
