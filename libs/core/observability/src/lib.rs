//! Observability utilities for the cloud advisor.
//!
//! - Prometheus recorder installation and `/metrics` rendering
//! - [`AdvisorMetrics`] for recommendation and estimate counters
//! - Axum middleware recording per-route HTTP metrics
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, AdvisorMetrics};
//!
//! init_metrics()?;
//! AdvisorMetrics::record_recommendation("game", started.elapsed());
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod advisor;
pub mod middleware;

pub use advisor::AdvisorMetrics;
pub use middleware::metrics_middleware;

pub use metrics::{counter, gauge, histogram};
pub use metrics_exporter_prometheus::BuildError;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "HTTP requests answered with a 4xx or 5xx status"
    );

    describe_counter!(
        "advisor_recommendations_total",
        "Recommendations produced, by project type"
    );
    describe_histogram!(
        "advisor_recommendation_duration_seconds",
        "Time to resolve and price a recommendation"
    );
    describe_histogram!(
        "advisor_budget_utilization_percent",
        "Budget utilization of produced recommendations"
    );
    describe_counter!(
        "advisor_budget_downgrades_total",
        "Offerings swapped for cheaper ones to fit a budget"
    );
    describe_counter!("advisor_estimates_total", "Cost estimates produced");
    describe_counter!(
        "advisor_unpriced_offerings_total",
        "Offerings estimated with the fallback unit price"
    );
    describe_counter!(
        "advisor_rejected_requests_total",
        "Requests rejected, by error kind"
    );
    describe_gauge!(
        "advisor_catalog_offerings",
        "Offerings in the loaded pricing table"
    );
}
