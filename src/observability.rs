use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservations committed.
pub const RESERVATIONS_CREATED_TOTAL: &str = "tiebreak_reservations_created_total";

/// Counter: reservations cancelled.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "tiebreak_reservations_cancelled_total";

/// Counter: reservations transitioned to completed.
pub const RESERVATIONS_COMPLETED_TOTAL: &str = "tiebreak_reservations_completed_total";

/// Counter: create/reschedule attempts rejected for overlap.
pub const CONFLICTS_REJECTED_TOTAL: &str = "tiebreak_conflicts_rejected_total";

/// Counter: availability queries served.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "tiebreak_availability_queries_total";

/// Histogram: conflict pre-check latency in seconds.
pub const CONFLICT_CHECK_DURATION_SECONDS: &str = "tiebreak_conflict_check_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Counter: commit-lock acquisitions that timed out.
pub const LOCK_TIMEOUTS_TOTAL: &str = "tiebreak_lock_timeouts_total";

/// Histogram: time spent waiting on a resource commit lock in seconds.
pub const LOCK_WAIT_DURATION_SECONDS: &str = "tiebreak_lock_wait_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
