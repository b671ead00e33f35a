use ulid::Ulid;

use crate::limits::MAX_QUERY_WINDOW_MS;
use crate::model::{Ms, Reservation, Span};
use crate::store::ReservationStore;

use super::availability::{busy_intervals, free_within};
use super::conflict::{first_conflict, validate_span};
use super::{Engine, EngineError};

impl<S: ReservationStore> Engine<S> {
    /// Standalone "is this slot free" pre-check. Pure read; the answer can be
    /// stale by the time a create lands, which re-checks under the lock.
    pub async fn check_conflict(
        &self,
        resource_id: Ulid,
        span: Span,
        exclude: Option<Ulid>,
    ) -> Result<bool, EngineError> {
        validate_span(&span)?;
        let check_start = std::time::Instant::now();
        let existing = self.store().list_blocking_reservations(resource_id).await?;
        let conflicted = first_conflict(&existing, &span, exclude).is_some();
        metrics::histogram!(crate::observability::CONFLICT_CHECK_DURATION_SECONDS)
            .record(check_start.elapsed().as_secs_f64());
        Ok(conflicted)
    }

    /// Blocking reservation intervals on `resource_id` intersecting `range`,
    /// sorted by `(start, end)`. Reflects committed state only.
    pub async fn availability(
        &self,
        resource_id: Ulid,
        range: Span,
    ) -> Result<Vec<Span>, EngineError> {
        validate_range(&range)?;
        metrics::counter!(crate::observability::AVAILABILITY_QUERIES_TOTAL).increment(1);
        let existing = self.store().list_blocking_reservations(resource_id).await?;
        Ok(busy_intervals(&existing, &range))
    }

    /// Derived view: open slots in `range`, i.e. the resource's operating
    /// window (or the whole range when it has none) minus booked intervals.
    pub async fn free_slots(
        &self,
        resource_id: Ulid,
        range: Span,
    ) -> Result<Vec<Span>, EngineError> {
        validate_range(&range)?;
        let resource = self.load_resource(resource_id).await?;
        let base = match resource.window {
            Some(window) => window.daily_spans(&range),
            None => vec![range],
        };
        let existing = self.store().list_blocking_reservations(resource_id).await?;
        let busy = busy_intervals(&existing, &range);
        Ok(free_within(&base, &busy))
    }

    pub async fn get_reservation(&self, id: Ulid) -> Result<Reservation, EngineError> {
        self.load_reservation(id).await
    }

    pub async fn reservations_for_subject(
        &self,
        subject_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError> {
        self.store().list_reservations_for_subject(subject_id).await
    }

    /// Blocking reservations whose span has fully elapsed at `now`, as
    /// `(reservation_id, resource_id)` pairs for the completion sweeper.
    pub async fn collect_elapsed(&self, now: Ms) -> Result<Vec<(Ulid, Ulid)>, EngineError> {
        let mut elapsed = Vec::new();
        for resource in self.store().list_resources().await? {
            for r in self.store().list_blocking_reservations(resource.id).await? {
                if r.span.end <= now {
                    elapsed.push((r.id, r.resource_id));
                }
            }
        }
        Ok(elapsed)
    }
}

fn validate_range(range: &Span) -> Result<(), EngineError> {
    if range.start >= range.end {
        return Err(EngineError::InvalidInterval {
            span: *range,
            reason: "start must be before end",
        });
    }
    if range.duration_ms() > MAX_QUERY_WINDOW_MS {
        return Err(EngineError::LimitExceeded("query window too wide"));
    }
    Ok(())
}
