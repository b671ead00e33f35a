use ulid::Ulid;

use crate::limits::MAX_BLOCKING_PER_RESOURCE;
use crate::model::{Reservation, ReservationStatus, Span};
use crate::store::{NewReservation, ReservationPatch, ReservationStore};

use super::conflict::{first_conflict, validate_span, validate_window};
use super::{Engine, EngineError};

impl<S: ReservationStore> Engine<S> {
    /// Book `span` on `resource_id` for `subject_id`. The conflict check and
    /// the insert run under the resource's commit lock, so two overlapping
    /// creates can never both pass the check.
    pub async fn create(
        &self,
        resource_id: Ulid,
        subject_id: Ulid,
        span: Span,
        price_cents: i64,
    ) -> Result<Reservation, EngineError> {
        let _guard = self.lock_resource(resource_id).await?;

        validate_span(&span)?;
        let resource = self.load_resource(resource_id).await?;
        validate_window(&resource, &span)?;

        let existing = self.store().list_blocking_reservations(resource_id).await?;
        if existing.len() >= MAX_BLOCKING_PER_RESOURCE {
            return Err(EngineError::LimitExceeded("too many reservations on resource"));
        }
        if let Some(hit) = first_conflict(&existing, &span, None) {
            metrics::counter!(crate::observability::CONFLICTS_REJECTED_TOTAL).increment(1);
            return Err(EngineError::Conflict {
                resource_id,
                conflicting: hit.span,
            });
        }

        let created = self
            .store()
            .insert_reservation(NewReservation {
                resource_id,
                subject_id,
                span,
                status: self.config().initial_status,
                price_cents,
            })
            .await?;
        metrics::counter!(crate::observability::RESERVATIONS_CREATED_TOTAL).increment(1);
        Ok(created)
    }

    /// Move a reservation in time and/or to another resource. Omitted values
    /// keep their current settings. Re-runs the conflict check against the
    /// effective target, excluding the reservation itself; the original is
    /// untouched on any failure.
    pub async fn reschedule(
        &self,
        reservation_id: Ulid,
        new_span: Option<Span>,
        new_resource_id: Option<Ulid>,
    ) -> Result<Reservation, EngineError> {
        let current = self.load_reservation(reservation_id).await?;
        let target_resource = new_resource_id.unwrap_or(current.resource_id);

        // Lock source and target up front; a cross-resource move must hold
        // both so neither side can admit an overlapping writer mid-flight.
        let _guards = self
            .lock_resources(current.resource_id, target_resource)
            .await?;

        // Re-read under the lock; a concurrent cancel may have landed.
        let current = self.load_reservation(reservation_id).await?;
        if current.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                id: reservation_id,
                from: current.status,
            });
        }

        let target_span = new_span.unwrap_or(current.span);
        validate_span(&target_span)?;
        let resource = self.load_resource(target_resource).await?;
        validate_window(&resource, &target_span)?;

        let existing = self
            .store()
            .list_blocking_reservations(target_resource)
            .await?;
        if let Some(hit) = first_conflict(&existing, &target_span, Some(reservation_id)) {
            metrics::counter!(crate::observability::CONFLICTS_REJECTED_TOTAL).increment(1);
            return Err(EngineError::Conflict {
                resource_id: target_resource,
                conflicting: hit.span,
            });
        }

        self.store()
            .update_reservation(
                reservation_id,
                ReservationPatch {
                    resource_id: Some(target_resource),
                    span: Some(target_span),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(EngineError::NotFound(reservation_id))
    }

    /// Transition to Cancelled. Idempotent: cancelling an already-cancelled
    /// reservation is a no-op success. Completed is terminal.
    pub async fn cancel(&self, reservation_id: Ulid) -> Result<Reservation, EngineError> {
        let current = self.load_reservation(reservation_id).await?;
        if current.status == ReservationStatus::Cancelled {
            return Ok(current);
        }

        let _guard = self.lock_resource(current.resource_id).await?;
        let current = self.load_reservation(reservation_id).await?;
        match current.status {
            ReservationStatus::Cancelled => Ok(current),
            ReservationStatus::Completed => Err(EngineError::InvalidTransition {
                id: reservation_id,
                from: current.status,
            }),
            _ => {
                let updated = self
                    .store()
                    .update_reservation(
                        reservation_id,
                        ReservationPatch {
                            status: Some(ReservationStatus::Cancelled),
                            ..Default::default()
                        },
                    )
                    .await?
                    .ok_or(EngineError::NotFound(reservation_id))?;
                metrics::counter!(crate::observability::RESERVATIONS_CANCELLED_TOTAL)
                    .increment(1);
                Ok(updated)
            }
        }
    }

    /// Transition to Completed once the booked span has elapsed. Idempotent
    /// on Completed; a Cancelled reservation stays cancelled.
    pub async fn complete(&self, reservation_id: Ulid) -> Result<Reservation, EngineError> {
        let current = self.load_reservation(reservation_id).await?;
        if current.status == ReservationStatus::Completed {
            return Ok(current);
        }

        let _guard = self.lock_resource(current.resource_id).await?;
        let current = self.load_reservation(reservation_id).await?;
        match current.status {
            ReservationStatus::Completed => Ok(current),
            ReservationStatus::Cancelled => Err(EngineError::InvalidTransition {
                id: reservation_id,
                from: current.status,
            }),
            _ => {
                let updated = self
                    .store()
                    .update_reservation(
                        reservation_id,
                        ReservationPatch {
                            status: Some(ReservationStatus::Completed),
                            ..Default::default()
                        },
                    )
                    .await?
                    .ok_or(EngineError::NotFound(reservation_id))?;
                metrics::counter!(crate::observability::RESERVATIONS_COMPLETED_TOTAL)
                    .increment(1);
                Ok(updated)
            }
        }
    }
}
