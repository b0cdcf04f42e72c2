//! Prometheus Metrics for the Hangar gateway
//!
//! Provides route guard, cookie issuance and frontend proxy metrics.

use lazy_static::lazy_static;
use prometheus::{self, Counter, CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Once;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Route Guard Metrics
    pub static ref GUARD_DECISIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("hangar_guard_decisions_total", "Route guard decisions on protected paths"),
        &["outcome"]
    ).unwrap();

    // Cookie Issuer Metrics
    pub static ref COOKIES_ISSUED_TOTAL: Counter = Counter::new(
        "hangar_cookies_issued_total",
        "Total calls to the cookie issuer"
    ).unwrap();

    // Proxy Metrics
    pub static ref PROXY_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("hangar_proxy_requests_total", "Total requests forwarded to the dashboard frontend"),
        &["status"]
    ).unwrap();

    pub static ref PROXY_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "hangar_proxy_duration_seconds",
            "Dashboard frontend request duration in seconds"
        ).buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method"]
    ).unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(GUARD_DECISIONS_TOTAL.clone()),
            Box::new(COOKIES_ISSUED_TOTAL.clone()),
            Box::new(PROXY_REQUESTS_TOTAL.clone()),
            Box::new(PROXY_DURATION.clone()),
        ];

        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!("Failed to register metric: {}", e);
            }
        }
    });
}

/// Handler for /metrics endpoint - returns Prometheus text format
pub async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}

/// Record a route guard decision (`redirect` or `forward`)
pub fn record_guard_decision(outcome: &str) {
    GUARD_DECISIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a cookie issuance
pub fn record_cookies_issued() {
    COOKIES_ISSUED_TOTAL.inc();
}

/// Record a request forwarded to the dashboard frontend
pub fn record_proxy_request(method: &str, status: u16, duration_secs: f64) {
    PROXY_REQUESTS_TOTAL
        .with_label_values(&[&status.to_string()])
        .inc();
    PROXY_DURATION
        .with_label_values(&[method])
        .observe(duration_secs);
}
