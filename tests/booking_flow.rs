//! End-to-end exercise of the public API: a club with two courts, a day of
//! bookings, a reschedule, a cancellation, and the derived views.

use std::sync::Arc;
use std::time::Duration;

use tiebreak::{
    Engine, EngineConfig, EngineError, MemoryStore, OpenWindow, Reservation, ReservationStatus,
    Resource, Span,
};
use tiebreak::model::{DAY_MS, HOUR_MS, MINUTE_MS, quote_price};
use tiebreak::store::ReservationStore;
use ulid::Ulid;

const DAY: i64 = 20_100 * DAY_MS;

fn at(hour: i64) -> i64 {
    DAY + hour * HOUR_MS
}

async fn club_with_two_courts(engine: &Engine<MemoryStore>) -> (Ulid, Ulid) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let club = Ulid::new();
    let court_a = Ulid::new();
    let court_b = Ulid::new();
    engine
        .store()
        .insert_resource(
            Resource::new(court_a, club, Some("Center Court".into()))
                .with_window(OpenWindow::new(8 * 60, 22 * 60))
                .with_hourly_rate(3000),
        )
        .await
        .unwrap();
    engine
        .store()
        .insert_resource(
            Resource::new(court_b, club, Some("Court 2".into()))
                .with_window(OpenWindow::new(8 * 60, 22 * 60))
                .with_hourly_rate(2000),
        )
        .await
        .unwrap();
    (court_a, court_b)
}

#[tokio::test]
async fn full_booking_day() {
    let engine = Engine::new(MemoryStore::new());
    let (court_a, court_b) = club_with_two_courts(&engine).await;
    let alice = Ulid::new();
    let bob = Ulid::new();

    // Alice books 10:00–11:30 on Center Court at the quoted rate.
    let span = Span::new(at(10), at(11) + 30 * MINUTE_MS);
    let price = quote_price(3000, &span);
    assert_eq!(price, 4500);
    let alice_booking: Reservation = engine.create(court_a, alice, span, price).await.unwrap();
    assert_eq!(alice_booking.status, ReservationStatus::Confirmed);

    // Bob probes the same slot, sees it taken, books Court 2 instead.
    assert!(engine.check_conflict(court_a, span, None).await.unwrap());
    assert!(!engine.check_conflict(court_b, span, None).await.unwrap());
    let bob_booking = engine
        .create(court_b, bob, span, quote_price(2000, &span))
        .await
        .unwrap();

    // Alice moves her booking an hour later; self-exclusion lets the
    // overlapping shift through.
    let shifted = Span::new(at(11), at(12) + 30 * MINUTE_MS);
    let alice_booking = engine
        .reschedule(alice_booking.id, Some(shifted), None)
        .await
        .unwrap();
    assert_eq!(alice_booking.span, shifted);

    // Busy view for Center Court reflects only the shifted booking.
    let busy = engine
        .availability(court_a, Span::new(at(8), at(22)))
        .await
        .unwrap();
    assert_eq!(busy, vec![shifted]);

    // Free slots exclude the booking and respect the operating window.
    let free = engine
        .free_slots(court_a, Span::new(DAY, DAY + DAY_MS))
        .await
        .unwrap();
    assert_eq!(
        free,
        vec![Span::new(at(8), at(11)), Span::new(at(12) + 30 * MINUTE_MS, at(22))]
    );

    // Bob cancels; his slot opens up again, and cancelling twice is a no-op.
    engine.cancel(bob_booking.id).await.unwrap();
    engine.cancel(bob_booking.id).await.unwrap();
    assert!(!engine.check_conflict(court_b, span, None).await.unwrap());

    // Alice's history lists both states faithfully.
    let alices = engine.reservations_for_subject(alice).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].span, shifted);
}

#[tokio::test]
async fn double_booking_race_has_one_winner() {
    let engine = Arc::new(Engine::with_config(
        MemoryStore::new(),
        EngineConfig {
            lock_timeout: Duration::from_secs(1),
            ..Default::default()
        },
    ));
    let (court_a, _) = club_with_two_courts(&engine).await;

    let span_a = Span::new(at(14), at(15));
    let span_b = Span::new(at(14) + 30 * MINUTE_MS, at(15) + 30 * MINUTE_MS);
    let t1 = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.create(court_a, Ulid::new(), span_a, 0).await })
    };
    let t2 = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.create(court_a, Ulid::new(), span_b, 0).await })
    };

    let results = [t1.await.unwrap(), t2.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EngineError::Conflict { .. }))));
}
