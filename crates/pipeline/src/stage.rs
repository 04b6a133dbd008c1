//! Stage sequence and the pluggable per-stage work.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use docflow_core::types::JobId;

/// One step of the processing pipeline, in execution order.
///
/// Each stage has a progress checkpoint that is recorded before its work
/// runs. Completion (100%) follows the last stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Transform,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Ingest, Stage::Transform, Stage::Finalize];

    /// Progress reported while this stage runs.
    pub fn checkpoint(self) -> u8 {
        match self {
            Stage::Ingest => 10,
            Stage::Transform => 50,
            Stage::Finalize => 90,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Transform => "transform",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything stage work needs to know about the job it runs for.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: JobId,
    pub filename: String,
    /// Raw uploaded content.
    pub payload: Vec<u8>,
}

impl JobContext {
    pub fn new(job_id: JobId, filename: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            job_id,
            filename: filename.into(),
            payload,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transformation failed: {0}")]
    Transform(String),
}

/// The work performed for one stage of one job.
///
/// Implementations must be cheap to share across jobs; the executor calls
/// `run` once per stage, in [`Stage::ALL`] order, and stops at the first
/// error.
#[async_trait]
pub trait StageWork: Send + Sync {
    async fn run(&self, stage: Stage, ctx: &JobContext) -> Result<(), StageError>;
}

/// Per-stage durations for [`SimulatedWork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub ingest: Duration,
    pub transform: Duration,
    pub finalize: Duration,
}

impl StageDelays {
    /// The same delay for every stage. Handy in tests.
    pub fn uniform(delay: Duration) -> Self {
        Self {
            ingest: delay,
            transform: delay,
            finalize: delay,
        }
    }

    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Ingest => self.ingest,
            Stage::Transform => self.transform,
            Stage::Finalize => self.finalize,
        }
    }

    pub fn total(&self) -> Duration {
        self.ingest + self.transform + self.finalize
    }
}

impl Default for StageDelays {
    /// 3s, 4s and 2s.
    fn default() -> Self {
        Self {
            ingest: Duration::from_secs(3),
            transform: Duration::from_secs(4),
            finalize: Duration::from_secs(2),
        }
    }
}

/// Stand-in for real document processing: waits a fixed time per stage.
#[derive(Debug, Clone, Default)]
pub struct SimulatedWork {
    delays: StageDelays,
}

impl SimulatedWork {
    pub fn new(delays: StageDelays) -> Self {
        Self { delays }
    }
}

#[async_trait]
impl StageWork for SimulatedWork {
    async fn run(&self, stage: Stage, ctx: &JobContext) -> Result<(), StageError> {
        let delay = self.delays.for_stage(stage);
        tracing::debug!(
            job_id = %ctx.job_id,
            stage = %stage,
            delay_ms = delay.as_millis() as u64,
            "Simulating stage work",
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}
