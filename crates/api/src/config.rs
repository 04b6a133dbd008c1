use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use docflow_pipeline::StageDelays;
use docflow_store::StoreConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight jobs, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 50 MiB).
    pub max_upload_bytes: usize,
    /// Per-stage durations of the simulated processing pipeline.
    pub stage_delays: StageDelays,
    /// Maximum number of tracked jobs (default: unbounded).
    pub job_capacity: Option<usize>,
    /// Seconds a finished job is kept before eviction (default: forever).
    pub job_ttl_secs: Option<u64>,
    /// How often the retention task looks for expired jobs (default: `60`).
    pub retention_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `8000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                    |
    /// | `MAX_UPLOAD_BYTES`            | `52428800`              |
    /// | `STAGE_INGEST_MS`             | `3000`                  |
    /// | `STAGE_TRANSFORM_MS`          | `4000`                  |
    /// | `STAGE_FINALIZE_MS`           | `2000`                  |
    /// | `JOB_CAPACITY`                | unset (unbounded), > 0  |
    /// | `JOB_TTL_SECS`                | unset (keep forever)    |
    /// | `JOB_RETENTION_INTERVAL_SECS` | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let stage_delays = StageDelays {
            ingest: Duration::from_millis(env_or("STAGE_INGEST_MS", 3000)),
            transform: Duration::from_millis(env_or("STAGE_TRANSFORM_MS", 4000)),
            finalize: Duration::from_millis(env_or("STAGE_FINALIZE_MS", 2000)),
        };

        Self {
            host,
            port: env_or("PORT", 8000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
            stage_delays,
            job_capacity: env_opt::<NonZeroUsize>("JOB_CAPACITY").map(NonZeroUsize::get),
            job_ttl_secs: env_opt("JOB_TTL_SECS"),
            retention_interval_secs: env_or("JOB_RETENTION_INTERVAL_SECS", 60),
        }
    }

    /// Retention bounds for the job store.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity: self.job_capacity,
            ttl: self.job_ttl_secs.map(Duration::from_secs),
        }
    }
}

/// Read and parse `key`, falling back to `default` when unset.
///
/// Panics if the variable is set but does not parse; misconfiguration should
/// stop the server at startup.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).unwrap_or(default)
}

fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => panic!("{key} must be a valid {}", std::any::type_name::<T>()),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
