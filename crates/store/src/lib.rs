//! In-memory job registry.
//!
//! [`JobStore`] maps job ids to [`JobRecord`](docflow_core::job::JobRecord)s
//! and is shared via `Arc<JobStore>` between the HTTP handlers and the
//! background executors. Records live for the lifetime of the process unless
//! a capacity or TTL is configured through [`StoreConfig`].

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{JobCounts, JobStore, StoreConfig};
