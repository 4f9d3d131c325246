use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;

/// Histogram: seconds spent recomputing one board. Labels: clinic.
pub const BOARD_RECOMPUTE_SECONDS: &str = "chairside_board_recompute_seconds";

/// Counter: snapshots swapped into a board. Labels: clinic.
pub const SNAPSHOTS_APPLIED_TOTAL: &str = "chairside_snapshots_applied_total";

/// Gauge: resources per occupancy status at the last recompute. Labels: clinic, status.
pub const RESOURCES_BY_STATUS: &str = "chairside_resources_by_status";

/// Gauge: overlapping appointment pairs in the current snapshot. Labels: clinic.
pub const DOUBLE_BOOKINGS: &str = "chairside_double_bookings";

/// Gauge: number of clinic boards held by the registry.
pub const CLINICS_ACTIVE: &str = "chairside_clinics_active";

/// Counter: snapshot reloads that failed validation or I/O.
pub const SNAPSHOT_ERRORS_TOTAL: &str = "chairside_snapshot_errors_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
