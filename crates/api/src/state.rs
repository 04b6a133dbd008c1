use std::sync::Arc;

use docflow_pipeline::{JobDispatcher, SimulatedWork, StageWork};
use docflow_store::JobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Registry of every job this process has accepted.
    pub store: Arc<JobStore>,
    /// Spawns background executors for accepted uploads.
    pub dispatcher: JobDispatcher,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State with the simulated, timed stage work from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let work = Arc::new(SimulatedWork::new(config.stage_delays));
        Self::with_work(config, work)
    }

    /// State with custom stage work plugged into the pipeline.
    pub fn with_work(config: ServerConfig, work: Arc<dyn StageWork>) -> Self {
        let store = Arc::new(JobStore::with_config(config.store_config()));
        let dispatcher = JobDispatcher::new(Arc::clone(&store), work);
        Self {
            store,
            dispatcher,
            config: Arc::new(config),
        }
    }
}
