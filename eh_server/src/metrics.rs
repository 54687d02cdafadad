//! Prometheus metrics for the tournament server.
//!
//! Metrics are recorded through the `metrics` facade. When no exporter is
//! installed every call is a no-op, which is how tests run.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration by method, route and status
//! - **Tournament Metrics**: Join outcomes, recorded results, created entities
//! - **Auth Metrics**: Login attempts and registrations
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use eh_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/tournaments/{id}/join", 200);
//! metrics::tournament_joins_total("success");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template, not the raw URI, to keep
/// label cardinality bounded.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Increment join attempts by outcome (`success` or an error code).
pub fn tournament_joins_total(outcome: &str) {
    metrics::counter!("tournament_joins_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Increment recorded match results; `winner` tells whether points were at stake.
pub fn match_results_recorded_total(winner: bool) {
    metrics::counter!("match_results_recorded_total",
        "winner" => winner.to_string()
    )
    .increment(1);
}

/// Increment created tournaments, matches or announcements.
pub fn entities_created_total(kind: &'static str) {
    metrics::counter!("entities_created_total", "kind" => kind).increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment successful registrations counter.
pub fn registrations_total() {
    metrics::counter!("registrations_total").increment(1);
}
