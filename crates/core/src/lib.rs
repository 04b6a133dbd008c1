//! Docflow domain types.
//!
//! Holds the job record, its status state machine and the shared error type.
//! This crate has no internal dependencies so the store, the pipeline and
//! the HTTP layer can all build on it.

pub mod error;
pub mod job;
pub mod types;
