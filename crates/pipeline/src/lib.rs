//! Background job execution.
//!
//! - [`stage`]: the fixed stage sequence and the [`StageWork`] seam where the
//!   actual document work plugs in ([`SimulatedWork`] sleeps instead).
//! - [`executor`]: drives one job through its stages, recording every
//!   checkpoint in the [`JobStore`](docflow_store::JobStore).
//! - [`dispatcher`]: spawns executors as detached tasks and isolates their
//!   failures and panics.

pub mod dispatcher;
pub mod executor;
pub mod stage;

pub use dispatcher::JobDispatcher;
pub use executor::{ExecutionFailure, JobExecutor};
pub use stage::{JobContext, SimulatedWork, Stage, StageDelays, StageError, StageWork};

#[cfg(test)]
pub(crate) mod test_support;
