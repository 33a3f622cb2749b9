use std::net::SocketAddr;

use crate::model::ValidationResult;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: validation passes executed. Labels: outcome.
pub const VALIDATIONS_TOTAL: &str = "paddock_validations_total";

/// Histogram: validation latency in seconds.
pub const VALIDATION_DURATION_SECONDS: &str = "paddock_validation_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Counter: resolved-block cache hits.
pub const BLOCK_CACHE_HITS_TOTAL: &str = "paddock_block_cache_hits_total";

/// Counter: resolved-block cache misses.
pub const BLOCK_CACHE_MISSES_TOTAL: &str = "paddock_block_cache_misses_total";

/// Counter: schedule blocks skipped because their boundaries don't parse.
pub const MALFORMED_BLOCKS_TOTAL: &str = "paddock_malformed_blocks_total";

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

/// Turnkey fmt subscriber for host binaries that don't bring their own.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

/// Map a validation outcome to a short label for metrics.
pub fn outcome_label(result: &ValidationResult) -> &'static str {
    if result.valid { "valid" } else { "rejected" }
}
