use ulid::Ulid;

use crate::limits::*;
use crate::model::{Reservation, Resource, Span};

use super::EngineError;

pub(crate) fn validate_span(span: &Span) -> Result<(), EngineError> {
    if span.start >= span.end {
        return Err(EngineError::InvalidInterval {
            span: *span,
            reason: "start must be before end",
        });
    }
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::InvalidInterval {
            span: *span,
            reason: "timestamp out of range",
        });
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::InvalidInterval {
            span: *span,
            reason: "span too wide",
        });
    }
    Ok(())
}

/// Reject spans outside the resource's daily operating window, when it has one.
pub(crate) fn validate_window(resource: &Resource, span: &Span) -> Result<(), EngineError> {
    if let Some(window) = resource.window
        && !window.covers(span)
    {
        return Err(EngineError::InvalidInterval {
            span: *span,
            reason: "outside resource operating hours",
        });
    }
    Ok(())
}

/// First blocking reservation overlapping `candidate`, skipping `exclude`
/// (a reservation never conflicts with itself on update). Short-circuits on
/// the first hit; the store hands us only blocking statuses, but re-checking
/// here keeps the predicate self-contained.
pub(crate) fn first_conflict<'a>(
    existing: &'a [Reservation],
    candidate: &Span,
    exclude: Option<Ulid>,
) -> Option<&'a Reservation> {
    existing.iter().find(|r| {
        r.status.is_blocking() && exclude != Some(r.id) && r.span.overlaps(candidate)
    })
}
