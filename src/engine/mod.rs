mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use availability::{busy_intervals, free_within, merge_overlapping, subtract_intervals};
pub use error::EngineError;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use ulid::Ulid;

use crate::model::{Reservation, ReservationStatus, Resource};
use crate::store::ReservationStore;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long create/reschedule/cancel may wait on a resource's commit lock.
    pub lock_timeout: Duration,
    /// Status given to freshly committed reservations. Confirmed by default;
    /// Pending for deployments with a payment step in front.
    pub initial_status: ReservationStatus,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            initial_status: ReservationStatus::Confirmed,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `TIEBREAK_LOCK_TIMEOUT_MS` and
    /// `TIEBREAK_INITIAL_STATUS` (`confirmed` | `pending`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = std::env::var("TIEBREAK_LOCK_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.lock_timeout = Duration::from_millis(ms);
        }
        if let Ok(s) = std::env::var("TIEBREAK_INITIAL_STATUS")
            && s.eq_ignore_ascii_case("pending")
        {
            config.initial_status = ReservationStatus::Pending;
        }
        config
    }
}

/// The single authority mutating reservation state. Serializes the
/// check-then-commit sequence per resource; cross-resource traffic never
/// contends.
pub struct Engine<S: ReservationStore> {
    store: S,
    /// Commit locks, one per resource, created lazily on first touch.
    locks: DashMap<Ulid, Arc<Mutex<()>>>,
    config: EngineConfig,
}

impl<S: ReservationStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            locks: DashMap::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Acquire the commit lock for one resource, bounded by the configured
    /// timeout. The guard must be held until the commit (or failure) is done.
    pub(super) async fn lock_resource(
        &self,
        resource_id: Ulid,
    ) -> Result<OwnedMutexGuard<()>, EngineError> {
        let lock = self
            .locks
            .entry(resource_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let wait_start = std::time::Instant::now();
        match tokio::time::timeout(self.config.lock_timeout, lock.lock_owned()).await {
            Ok(guard) => {
                metrics::histogram!(crate::observability::LOCK_WAIT_DURATION_SECONDS)
                    .record(wait_start.elapsed().as_secs_f64());
                Ok(guard)
            }
            Err(_) => {
                metrics::counter!(crate::observability::LOCK_TIMEOUTS_TOTAL).increment(1);
                Err(EngineError::LockTimeout(resource_id))
            }
        }
    }

    /// Lock one or two resources in sorted ID order to rule out deadlock
    /// between concurrent cross-resource reschedules.
    pub(super) async fn lock_resources(
        &self,
        a: Ulid,
        b: Ulid,
    ) -> Result<Vec<OwnedMutexGuard<()>>, EngineError> {
        let mut ids = vec![a, b];
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock_resource(id).await?);
        }
        Ok(guards)
    }

    pub(super) async fn load_resource(&self, id: Ulid) -> Result<Resource, EngineError> {
        self.store
            .get_resource(id)
            .await?
            .ok_or(EngineError::NotFound(id))
    }

    pub(super) async fn load_reservation(&self, id: Ulid) -> Result<Reservation, EngineError> {
        self.store
            .get_reservation(id)
            .await?
            .ok_or(EngineError::NotFound(id))
    }
}
