use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::engine::Engine;
use crate::model::now_ms;
use crate::store::ReservationStore;

/// Background task that periodically marks elapsed reservations Completed.
pub async fn run_completer<S: ReservationStore>(engine: Arc<Engine<S>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let now = now_ms();
        let elapsed = match engine.collect_elapsed(now).await {
            Ok(elapsed) => elapsed,
            Err(e) => {
                tracing::warn!("completion sweep failed: {e}");
                continue;
            }
        };
        for (reservation_id, _resource_id) in elapsed {
            match engine.complete(reservation_id).await {
                Ok(_) => info!("completed elapsed reservation {reservation_id}"),
                Err(e) => {
                    // May have been cancelled in the meantime — that's fine
                    tracing::debug!("completer skip {reservation_id}: {e}");
                }
            }
        }
    }
}
