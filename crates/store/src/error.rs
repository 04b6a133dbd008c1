use docflow_core::error::CoreError;
use docflow_core::types::JobId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job {0} not found")]
    NotFound(JobId),

    #[error("Job {0} already exists")]
    DuplicateKey(JobId),

    #[error("Job store is full ({0} records) and no finished job can be evicted")]
    CapacityExceeded(usize),

    /// The update would break a lifecycle invariant; the record is unchanged.
    #[error(transparent)]
    Rejected(#[from] CoreError),
}
