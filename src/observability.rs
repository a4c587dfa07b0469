use std::net::SocketAddr;

use crate::command::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total operations dispatched. Labels: command, status.
pub const OPS_TOTAL: &str = "gymrack_ops_total";

/// Histogram: operation latency in seconds. Labels: command.
pub const OP_DURATION_SECONDS: &str = "gymrack_op_duration_seconds";

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

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Start { .. } => "start",
        Command::Finish { .. } => "finish",
        Command::Wait { .. } => "wait",
        Command::Reserve { .. } => "reserve",
        Command::Cancel { .. } => "cancel",
        Command::Status => "status",
    }
}
