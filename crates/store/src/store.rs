use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use docflow_core::job::{JobRecord, JobStatus, JobUpdate};
use docflow_core::types::JobId;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::StoreError;

/// Optional bounds on how many records the store keeps.
///
/// Both default to `None`: every record is kept until the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// Maximum number of records. When full, `create` evicts the oldest
    /// finished record, or fails if every record is still in flight.
    pub capacity: Option<usize>,
    /// How long a finished record is kept before `evict_expired` drops it.
    pub ttl: Option<Duration>,
}

/// Record counts by status, for service metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub accepted: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

struct Entry {
    record: JobRecord,
    /// Set when the record reaches a terminal status. Drives eviction.
    finished_at: Option<Instant>,
}

type Slot = Arc<RwLock<Entry>>;

/// Concurrent registry of job records.
///
/// The outer map lock is held only to look up, insert or remove a slot.
/// Each record sits behind its own lock, so updates to different jobs never
/// wait on each other while updates to the same job are serialized. The map
/// lock is never requested while a slot lock is held.
pub struct JobStore {
    config: StoreConfig,
    jobs: RwLock<HashMap<JobId, Slot>>,
}

impl JobStore {
    /// An unbounded store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Insert a new record keyed by its `job_id`.
    ///
    /// Never overwrites: an existing key yields [`StoreError::DuplicateKey`].
    /// With a capacity and a full store, the oldest finished record is
    /// evicted first. The eviction candidate is chosen without holding the
    /// map's write lock; it is only removed if it is still present once the
    /// lock is taken.
    pub async fn create(&self, record: JobRecord) -> Result<(), StoreError> {
        let job_id = record.job_id;
        let finished_at = record.status.is_terminal().then(Instant::now);
        let slot = Arc::new(RwLock::new(Entry {
            record,
            finished_at,
        }));

        let Some(capacity) = self.config.capacity else {
            let mut jobs = self.jobs.write().await;
            if jobs.contains_key(&job_id) {
                return Err(StoreError::DuplicateKey(job_id));
            }
            jobs.insert(job_id, slot);
            return Ok(());
        };

        loop {
            let victim = if self.len().await >= capacity {
                Some(
                    self.oldest_finished()
                        .await
                        .ok_or(StoreError::CapacityExceeded(capacity))?,
                )
            } else {
                None
            };

            let mut jobs = self.jobs.write().await;
            if jobs.contains_key(&job_id) {
                return Err(StoreError::DuplicateKey(job_id));
            }

            if jobs.len() >= capacity {
                // The store changed since the candidate was picked; pick again.
                let Some(victim) = victim.filter(|v| jobs.contains_key(v)) else {
                    continue;
                };
                jobs.remove(&victim);
                tracing::debug!(job_id = %victim, capacity, "Evicted finished job to make room");
            }

            jobs.insert(job_id, slot);
            return Ok(());
        }
    }

    /// Snapshot of the current record.
    pub async fn get(&self, job_id: JobId) -> Result<JobRecord, StoreError> {
        let slot = self.slot(job_id).await?;
        let entry = slot.read().await;
        Ok(entry.record.clone())
    }

    /// Merge `update` into the record and return the new snapshot.
    ///
    /// All fields of one update become visible together: the merge is
    /// computed on a copy and swapped in under the record's write lock. An
    /// update that breaks a lifecycle rule leaves the record untouched.
    pub async fn update(&self, job_id: JobId, update: JobUpdate) -> Result<JobRecord, StoreError> {
        let slot = self.slot(job_id).await?;
        let mut entry = slot.write().await;

        let next = entry.record.apply(&update)?;
        if next.status.is_terminal() {
            entry.finished_at = Some(Instant::now());
        }
        entry.record = next.clone();
        Ok(next)
    }

    /// Number of records currently tracked.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn counts(&self) -> JobCounts {
        let slots = self.slots().await;
        let mut counts = JobCounts {
            total: slots.len(),
            ..JobCounts::default()
        };
        for slot in slots {
            match slot.read().await.record.status {
                JobStatus::Accepted => counts.accepted += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Drop finished records older than the configured TTL.
    ///
    /// Returns the number of records removed. A no-op without a TTL.
    /// Records still in flight are never touched.
    pub async fn evict_expired(&self) -> usize {
        let Some(ttl) = self.config.ttl else {
            return 0;
        };

        let snapshot = self.entries().await;

        let now = Instant::now();
        let mut expired = Vec::new();
        for (job_id, slot) in snapshot {
            let finished_at = slot.read().await.finished_at;
            if finished_at.is_some_and(|at| now.duration_since(at) >= ttl) {
                expired.push(job_id);
            }
        }

        if expired.is_empty() {
            return 0;
        }

        // Terminal records cannot change, so the expiry decision still holds.
        let mut jobs = self.jobs.write().await;
        expired
            .iter()
            .filter(|job_id| jobs.remove(*job_id).is_some())
            .count()
    }

    async fn slot(&self, job_id: JobId) -> Result<Slot, StoreError> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or(StoreError::NotFound(job_id))
    }

    async fn slots(&self) -> Vec<Slot> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Every `(id, slot)` pair, copied out so the map lock is released
    /// before any slot lock is taken.
    async fn entries(&self) -> Vec<(JobId, Slot)> {
        self.jobs
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect()
    }

    /// The finished record that reached its terminal state first, if any.
    async fn oldest_finished(&self) -> Option<JobId> {
        let mut oldest: Option<(JobId, Instant)> = None;
        for (job_id, slot) in self.entries().await {
            let Some(finished_at) = slot.read().await.finished_at else {
                continue;
            };
            match oldest {
                Some((_, at)) if at <= finished_at => {}
                _ => oldest = Some((job_id, finished_at)),
            }
        }
        oldest.map(|(job_id, _)| job_id)
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
