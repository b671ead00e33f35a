//! Storage collaborator boundary. The engine owns scheduling decisions;
//! a `ReservationStore` owns durability. `MemoryStore` is the in-process
//! implementation used by tests and single-node embeddings.

use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::engine::EngineError;
use crate::limits::MAX_NAME_LEN;
use crate::model::{Reservation, ReservationStatus, Resource, Span, now_ms};

/// Insert payload; the store assigns `id`, `created_at`, and `updated_at`.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub resource_id: Ulid,
    pub subject_id: Ulid,
    pub span: Span,
    pub status: ReservationStatus,
    pub price_cents: i64,
}

/// Partial update; `None` fields are left untouched. `updated_at` is
/// always refreshed on a successful update.
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub resource_id: Option<Ulid>,
    pub span: Option<Span>,
    pub status: Option<ReservationStatus>,
    pub price_cents: Option<i64>,
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get_resource(&self, id: Ulid) -> Result<Option<Resource>, EngineError>;
    async fn insert_resource(&self, resource: Resource) -> Result<(), EngineError>;
    async fn list_resources(&self) -> Result<Vec<Resource>, EngineError>;

    /// All reservations on `resource_id` whose status still occupies the
    /// resource (Pending or Confirmed), in no particular order.
    async fn list_blocking_reservations(
        &self,
        resource_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError>;

    async fn list_reservations_for_subject(
        &self,
        subject_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError>;

    async fn get_reservation(&self, id: Ulid) -> Result<Option<Reservation>, EngineError>;

    async fn insert_reservation(&self, new: NewReservation) -> Result<Reservation, EngineError>;

    /// Returns `None` when the reservation does not exist.
    async fn update_reservation(
        &self,
        id: Ulid,
        patch: ReservationPatch,
    ) -> Result<Option<Reservation>, EngineError>;
}

pub struct MemoryStore {
    resources: DashMap<Ulid, Resource>,
    reservations: DashMap<Ulid, Reservation>,
    /// Resource → reservation ids, including historical ones.
    by_resource: DashMap<Ulid, Vec<Ulid>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            resources: DashMap::new(),
            reservations: DashMap::new(),
            by_resource: DashMap::new(),
        }
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn get_resource(&self, id: Ulid) -> Result<Option<Resource>, EngineError> {
        Ok(self.resources.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_resource(&self, resource: Resource) -> Result<(), EngineError> {
        if let Some(ref n) = resource.name
            && n.len() > MAX_NAME_LEN {
                return Err(EngineError::LimitExceeded("resource name too long"));
            }
        self.resources.insert(resource.id, resource);
        Ok(())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, EngineError> {
        Ok(self.resources.iter().map(|e| e.value().clone()).collect())
    }

    async fn list_blocking_reservations(
        &self,
        resource_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError> {
        let ids = self
            .by_resource
            .get(&resource_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.reservations.get(id))
            .filter(|r| r.status.is_blocking())
            .map(|r| r.value().clone())
            .collect())
    }

    async fn list_reservations_for_subject(
        &self,
        subject_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError> {
        let mut out: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.subject_id == subject_id)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|r| r.span.start);
        Ok(out)
    }

    async fn get_reservation(&self, id: Ulid) -> Result<Option<Reservation>, EngineError> {
        Ok(self.reservations.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_reservation(&self, new: NewReservation) -> Result<Reservation, EngineError> {
        let now = now_ms();
        let reservation = Reservation {
            id: Ulid::new(),
            resource_id: new.resource_id,
            subject_id: new.subject_id,
            span: new.span,
            status: new.status,
            price_cents: new.price_cents,
            created_at: now,
            updated_at: now,
        };
        self.by_resource
            .entry(reservation.resource_id)
            .or_default()
            .push(reservation.id);
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation(
        &self,
        id: Ulid,
        patch: ReservationPatch,
    ) -> Result<Option<Reservation>, EngineError> {
        let Some(mut entry) = self.reservations.get_mut(&id) else {
            return Ok(None);
        };
        let old_resource = entry.resource_id;
        if let Some(resource_id) = patch.resource_id {
            entry.resource_id = resource_id;
        }
        if let Some(span) = patch.span {
            entry.span = span;
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(price_cents) = patch.price_cents {
            entry.price_cents = price_cents;
        }
        entry.updated_at = now_ms();
        let updated = entry.value().clone();
        drop(entry);

        if updated.resource_id != old_resource {
            if let Some(mut ids) = self.by_resource.get_mut(&old_resource) {
                ids.retain(|rid| rid != &id);
            }
            self.by_resource
                .entry(updated.resource_id)
                .or_default()
                .push(id);
        }
        Ok(Some(updated))
    }
}
