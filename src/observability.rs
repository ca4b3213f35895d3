use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: decoded requests. Labels: kind, status.
pub const REQUESTS_TOTAL: &str = "ticketd_requests_total";

/// Histogram: request handling latency in seconds. Labels: kind.
pub const REQUEST_DURATION_SECONDS: &str = "ticketd_request_duration_seconds";

/// Counter: datagrams dropped because they failed to decode.
pub const DATAGRAMS_DROPPED_TOTAL: &str = "ticketd_datagrams_dropped_total";

// ── Inventory ───────────────────────────────────────────────────

/// Counter: reservations granted.
pub const RESERVATIONS_TOTAL: &str = "ticketd_reservations_total";

/// Counter: uncompleted reservations whose tickets went back to their event.
pub const RESERVATIONS_REAPED_TOTAL: &str = "ticketd_reservations_reaped_total";

/// Counter: ticket codes issued.
pub const TICKETS_ISSUED_TOTAL: &str = "ticketd_tickets_issued_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
