//! Job record, status state machine and partial updates.
//!
//! A [`JobRecord`] is created once in [`JobStatus::Accepted`] and then only
//! changes through [`JobRecord::apply`], which enforces the lifecycle rules:
//!
//! ```text
//! accepted -> processing -> completed
//!     |            |
//!     +------------+-------> failed
//! ```
//!
//! Completed and failed are terminal. `progress` never decreases and only
//! reaches 100 together with `completed`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Progress reported by a freshly accepted job.
pub const PROGRESS_ACCEPTED: u8 = 0;

/// Progress reported once a job has completed.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Path prefix under which finished artifacts are advertised.
pub const RESULT_URL_PREFIX: &str = "/download/";

/// Build the advertised result location for a job.
pub fn result_url(job_id: JobId) -> String {
    format!("{RESULT_URL_PREFIX}{job_id}")
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Accepted,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Accepted => "accepted",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Statuses reachable from `self` in one step.
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Accepted => &[JobStatus::Processing, JobStatus::Failed],
            JobStatus::Processing => &[JobStatus::Completed, JobStatus::Failed],
            JobStatus::Completed | JobStatus::Failed => &[],
        }
    }

    pub fn can_transition(self, to: JobStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Everything the service knows about one submitted job.
///
/// Optional fields are omitted from JSON until the matching transition
/// populates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub filename: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    /// A new record in the accepted state with zero progress.
    pub fn new(job_id: JobId, filename: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            job_id,
            filename: filename.into(),
            status: JobStatus::Accepted,
            progress: PROGRESS_ACCEPTED,
            created_at,
            completed_at: None,
            result_url: None,
            error: None,
        }
    }

    /// Accept a new upload: fresh v4 id, created now.
    pub fn accept(filename: impl Into<String>) -> Self {
        Self::new(JobId::new_v4(), filename, chrono::Utc::now())
    }

    /// Merge `update` into a copy of this record.
    ///
    /// Returns the merged record, or an error if the result would break a
    /// lifecycle invariant. `self` is never modified, so callers can swap the
    /// result in as a whole.
    pub fn apply(&self, update: &JobUpdate) -> Result<Self, CoreError> {
        let target = update.status.unwrap_or(self.status);

        if self.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        if target != self.status && !self.status.can_transition(target) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        let mut next = self.clone();
        next.status = target;

        if let Some(progress) = update.progress {
            if progress > PROGRESS_COMPLETE {
                return Err(CoreError::Validation(format!(
                    "progress must be at most {PROGRESS_COMPLETE}, got {progress}"
                )));
            }
            if progress < self.progress {
                return Err(CoreError::Validation(format!(
                    "progress cannot decrease from {} to {progress}",
                    self.progress
                )));
            }
            if target == JobStatus::Failed && progress != self.progress {
                return Err(CoreError::Validation(
                    "progress is frozen when a job fails".into(),
                ));
            }
            next.progress = progress;
        }

        if let Some(at) = update.completed_at {
            next.completed_at = Some(at);
        }
        if let Some(url) = &update.result_url {
            next.result_url = Some(url.clone());
        }
        if let Some(error) = &update.error {
            next.error = Some(error.clone());
        }

        next.check_invariants()?;
        Ok(next)
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        let completed = self.status == JobStatus::Completed;
        let failed = self.status == JobStatus::Failed;

        if completed != (self.progress == PROGRESS_COMPLETE) {
            return Err(CoreError::Validation(format!(
                "progress {PROGRESS_COMPLETE} is reached exactly on completion (status {}, progress {})",
                self.status, self.progress
            )));
        }
        if completed != self.completed_at.is_some() || completed != self.result_url.is_some() {
            return Err(CoreError::Validation(
                "completed_at and result_url are set exactly on completion".into(),
            ));
        }
        if failed != self.error.is_some() {
            return Err(CoreError::Validation(
                "error is set exactly on failure".into(),
            ));
        }
        if self.error.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(CoreError::Validation(
                "failure description must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// A set of fields to merge into a [`JobRecord`] in one step.
///
/// `None` fields are left untouched. Built with the `with_*` methods or one
/// of the lifecycle constructors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub completed_at: Option<Timestamp>,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_completed_at(mut self, at: Timestamp) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        self.result_url = Some(url.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Move into `processing` at the given checkpoint.
    pub fn processing(progress: u8) -> Self {
        Self::new()
            .with_status(JobStatus::Processing)
            .with_progress(progress)
    }

    /// Finish successfully: full progress, completion time and result URL.
    pub fn completed(job_id: JobId, at: Timestamp) -> Self {
        Self::new()
            .with_status(JobStatus::Completed)
            .with_progress(PROGRESS_COMPLETE)
            .with_completed_at(at)
            .with_result_url(result_url(job_id))
    }

    /// Fail with a description. Progress is left where it was.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new().with_status(JobStatus::Failed).with_error(error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
