use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 3_600_000;
pub const DAY_MS: Ms = 86_400_000;

pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Where a reservation sits in its lifecycle. Only Pending and Confirmed
/// occupy the resource; Cancelled and Completed are terminal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn is_blocking(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Completed)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A committed booking of one resource by one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub resource_id: Ulid,
    pub subject_id: Ulid,
    pub span: Span,
    pub status: ReservationStatus,
    /// Derived quantity; never consulted by scheduling decisions.
    pub price_cents: i64,
    pub created_at: Ms,
    pub updated_at: Ms,
}

/// Daily operating window in minutes from UTC midnight, e.g. 08:00–22:00
/// is `OpenWindow::new(480, 1320)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindow {
    pub open_min: u16,
    pub close_min: u16,
}

impl OpenWindow {
    pub fn new(open_min: u16, close_min: u16) -> Self {
        debug_assert!(open_min < close_min && close_min <= 1440);
        Self { open_min, close_min }
    }

    fn bounds_for_day(&self, day_start: Ms) -> Span {
        Span::new(
            day_start + self.open_min as Ms * MINUTE_MS,
            day_start + self.close_min as Ms * MINUTE_MS,
        )
    }

    /// True if `span` lies inside the window of the UTC day it starts on.
    pub fn covers(&self, span: &Span) -> bool {
        let day_start = span.start - span.start.rem_euclid(DAY_MS);
        self.bounds_for_day(day_start).contains_span(span)
    }

    /// Open spans for every UTC day touched by `range`, clamped to `range`
    /// and sorted ascending.
    pub fn daily_spans(&self, range: &Span) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut day_start = range.start - range.start.rem_euclid(DAY_MS);
        while day_start < range.end {
            let open = self.bounds_for_day(day_start);
            if open.overlaps(range) {
                spans.push(Span::new(
                    open.start.max(range.start),
                    open.end.min(range.end),
                ));
            }
            day_start += DAY_MS;
        }
        spans
    }
}

/// A bookable unit (a court), owned by exactly one club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Ulid,
    pub club_id: Ulid,
    pub name: Option<String>,
    /// Absent means the resource is bookable around the clock.
    pub window: Option<OpenWindow>,
    pub price_per_hour_cents: i64,
}

impl Resource {
    pub fn new(id: Ulid, club_id: Ulid, name: Option<String>) -> Self {
        Self {
            id,
            club_id,
            name,
            window: None,
            price_per_hour_cents: 0,
        }
    }

    pub fn with_window(mut self, window: OpenWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_hourly_rate(mut self, price_per_hour_cents: i64) -> Self {
        self.price_per_hour_cents = price_per_hour_cents;
        self
    }
}

/// Price quote for a span at an hourly rate, pro-rated to the millisecond
/// and truncated toward zero.
pub fn quote_price(price_per_hour_cents: i64, span: &Span) -> i64 {
    price_per_hour_cents * span.duration_ms() / HOUR_MS
}
