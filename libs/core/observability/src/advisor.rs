//! Recommendation engine metrics

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Advisor metrics recorder
pub struct AdvisorMetrics;

impl AdvisorMetrics {
    /// Record a completed recommendation
    pub fn record_recommendation(project_type: &str, elapsed: Duration) {
        counter!("advisor_recommendations_total", "project_type" => project_type.to_string())
            .increment(1);
        histogram!(
            "advisor_recommendation_duration_seconds",
            "project_type" => project_type.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    pub fn record_budget_utilization(project_type: &str, utilization: f64) {
        histogram!(
            "advisor_budget_utilization_percent",
            "project_type" => project_type.to_string()
        )
        .record(utilization);
    }

    pub fn record_downgrades(slot: &str, count: usize) {
        counter!("advisor_budget_downgrades_total", "slot" => slot.to_string())
            .increment(count as u64);
    }

    pub fn record_estimate(offerings: usize) {
        counter!("advisor_estimates_total").increment(1);

        tracing::debug!(offerings, "Recorded cost estimate");
    }

    /// An offering was priced with the fallback unit price
    pub fn record_unpriced_offering(slot: &str) {
        counter!("advisor_unpriced_offerings_total", "slot" => slot.to_string()).increment(1);
    }

    /// A request failed; `kind` is the stable error identifier
    pub fn record_rejected(operation: &str, kind: &str) {
        counter!(
            "advisor_rejected_requests_total",
            "operation" => operation.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    pub fn set_catalog_size(offerings: usize) {
        gauge!("advisor_catalog_offerings").set(offerings as f64);
    }
}
