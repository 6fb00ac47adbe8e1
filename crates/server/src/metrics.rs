//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the gateway:
//! - HTTP request metrics (latency, counts, errors)
//! - Conversion outcomes by input source
//! - Transcode duration
//! - Artifacts currently on disk (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "opusgate_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("opusgate_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "opusgate_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "opusgate_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Finished conversion jobs by input source and outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "opusgate_conversions_total",
            "Conversion jobs by input source and outcome",
        ),
        &["source", "outcome"],
    )
    .unwrap()
});

/// Wall time of successful transcodes.
pub static TRANSCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "opusgate_transcode_duration_seconds",
            "Time spent in the transcoder for successful jobs",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["source"],
    )
    .unwrap()
});

/// Artifacts on disk (collected dynamically).
pub static ARTIFACTS_ALIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "opusgate_artifacts_alive",
        "Number of converted files not yet deleted",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Conversions
    registry
        .register(Box::new(CONVERSIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TRANSCODE_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(ARTIFACTS_ALIVE.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    ARTIFACTS_ALIVE.set(state.conversions().artifacts().live_count() as i64);
}

/// Path label for a request. Unknown paths share one label so scanners
/// cannot blow up the series count.
pub fn normalize_path(path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" | "/convert" | "/convert-url" => path.to_string(),
        _ => "{unmatched}".to_string(),
    }
}
