use std::net::SocketAddr;

use crate::command::Command;

// ── Command metrics ─────────────────────────────────────────────

/// Counter: commands handled. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "playslot_commands_total";

/// Histogram: command handling latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "playslot_command_duration_seconds";

/// Counter: input lines that did not parse as a command.
pub const INVALID_COMMANDS_TOTAL: &str = "playslot_invalid_commands_total";

// ── Booking metrics ─────────────────────────────────────────────

/// Counter: bookings accepted and stored.
pub const BOOKINGS_CONFIRMED_TOTAL: &str = "playslot_bookings_confirmed_total";

/// Counter: submissions rejected because they overlap a stored booking.
pub const CONFLICTS_TOTAL: &str = "playslot_conflicts_total";

/// Counter: loads that found unreadable or malformed data and fell back to empty.
pub const STORE_LOAD_FAILURES_TOTAL: &str = "playslot_store_load_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Submit(_) => "submit",
        Command::Cancel { .. } => "cancel",
        Command::Clear => "clear",
        Command::Filter { .. } => "filter",
        Command::Show => "show",
    }
}
