use crate::model::{Reservation, Span};

// ── Availability Algorithm ────────────────────────────────────────

/// Blocking reservation intervals intersecting `query`, sorted ascending by
/// `start`, ties broken by `end`. Intervals are returned whole, not clamped
/// to the query range.
pub fn busy_intervals(reservations: &[Reservation], query: &Span) -> Vec<Span> {
    let mut busy: Vec<Span> = reservations
        .iter()
        .filter(|r| r.status.is_blocking() && r.span.overlaps(query))
        .map(|r| r.span)
        .collect();
    busy.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    busy
}

/// Complement of `busy` within the open spans `base` (both sorted ascending):
/// the free slots a caller can still book.
pub fn free_within(base: &[Span], busy: &[Span]) -> Vec<Span> {
    let clamped: Vec<Span> = busy
        .iter()
        .filter_map(|b| {
            let lo = base.first()?.start.max(b.start);
            let hi = base.last()?.end.min(b.end);
            (lo < hi).then(|| Span::new(lo, hi))
        })
        .collect();
    let merged = merge_overlapping(&clamped);
    subtract_intervals(base, &merged)
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// Subtract sorted `to_remove` from sorted `base`.
pub fn subtract_intervals(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Span::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Span::new(current_start, current_end));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HOUR_MS as H, MINUTE_MS as M, ReservationStatus, now_ms};
    use ulid::Ulid;

    fn booking(start: i64, end: i64, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Ulid::new(),
            resource_id: Ulid::new(),
            subject_id: Ulid::new(),
            span: Span::new(start, end),
            status,
            price_cents: 0,
            created_at: now_ms(),
            updated_at: now_ms(),
        }
    }

    // ── busy_intervals ────────────────────────────────────

    #[test]
    fn busy_sorted_and_filtered() {
        let reservations = vec![
            booking(9 * H, 10 * H, ReservationStatus::Confirmed),
            booking(8 * H, 9 * H, ReservationStatus::Confirmed),
            booking(11 * H, 12 * H, ReservationStatus::Cancelled),
        ];
        let busy = busy_intervals(&reservations, &Span::new(7 * H, 13 * H));
        assert_eq!(busy, vec![Span::new(8 * H, 9 * H), Span::new(9 * H, 10 * H)]);
    }

    #[test]
    fn busy_tie_on_start_breaks_by_end() {
        let reservations = vec![
            booking(9 * H, 11 * H, ReservationStatus::Pending),
            booking(9 * H, 10 * H, ReservationStatus::Confirmed),
        ];
        let busy = busy_intervals(&reservations, &Span::new(0, 24 * H));
        assert_eq!(busy, vec![Span::new(9 * H, 10 * H), Span::new(9 * H, 11 * H)]);
    }

    #[test]
    fn busy_excludes_adjacent_to_range() {
        // Ends exactly at range start → not intersecting (half-open).
        let reservations = vec![booking(6 * H, 7 * H, ReservationStatus::Confirmed)];
        let busy = busy_intervals(&reservations, &Span::new(7 * H, 13 * H));
        assert!(busy.is_empty());
    }

    #[test]
    fn busy_keeps_partial_overlap_unclamped() {
        let reservations = vec![booking(6 * H, 8 * H, ReservationStatus::Confirmed)];
        let busy = busy_intervals(&reservations, &Span::new(7 * H, 13 * H));
        assert_eq!(busy, vec![Span::new(6 * H, 8 * H)]);
    }

    // ── merge_overlapping ────────────────────────────────

    #[test]
    fn merge_overlapping_basic() {
        let spans = vec![Span::new(100, 300), Span::new(200, 400), Span::new(500, 600)];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 400), Span::new(500, 600)]);
    }

    #[test]
    fn merge_overlapping_adjacent() {
        let spans = vec![Span::new(100, 200), Span::new(200, 300)];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 300)]);
    }

    // ── subtract_intervals ────────────────────────────────

    #[test]
    fn subtract_no_overlap() {
        let base = vec![Span::new(100, 200), Span::new(300, 400)];
        let remove = vec![Span::new(200, 300)];
        assert_eq!(subtract_intervals(&base, &remove), base);
    }

    #[test]
    fn subtract_full_overlap() {
        let base = vec![Span::new(100, 200)];
        let remove = vec![Span::new(50, 250)];
        assert!(subtract_intervals(&base, &remove).is_empty());
    }

    #[test]
    fn subtract_middle_punch() {
        let base = vec![Span::new(100, 300)];
        let remove = vec![Span::new(150, 200)];
        assert_eq!(
            subtract_intervals(&base, &remove),
            vec![Span::new(100, 150), Span::new(200, 300)]
        );
    }

    #[test]
    fn subtract_multiple_punches() {
        let base = vec![Span::new(0, 1000)];
        let remove = vec![Span::new(100, 200), Span::new(400, 500), Span::new(800, 900)];
        assert_eq!(
            subtract_intervals(&base, &remove),
            vec![
                Span::new(0, 100),
                Span::new(200, 400),
                Span::new(500, 800),
                Span::new(900, 1000),
            ]
        );
    }

    // ── free_within ───────────────────────────────────────

    #[test]
    fn free_within_punches_bookings_out_of_window() {
        let base = vec![Span::new(9 * H, 12 * H)];
        let busy = vec![Span::new(10 * H, 10 * H + 30 * M)];
        assert_eq!(
            free_within(&base, &busy),
            vec![Span::new(9 * H, 10 * H), Span::new(10 * H + 30 * M, 12 * H)]
        );
    }

    #[test]
    fn free_within_clamps_busy_outside_base() {
        // Booking starts before the window opens.
        let base = vec![Span::new(9 * H, 12 * H)];
        let busy = vec![Span::new(8 * H, 10 * H)];
        assert_eq!(free_within(&base, &busy), vec![Span::new(10 * H, 12 * H)]);
    }

    #[test]
    fn free_within_fully_booked() {
        let base = vec![Span::new(9 * H, 12 * H)];
        let busy = vec![Span::new(9 * H, 10 * H), Span::new(10 * H, 12 * H)];
        assert!(free_within(&base, &busy).is_empty());
    }
}
