use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Result type for advisor operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Errors that can occur while recommending or estimating
#[derive(Debug, Error, PartialEq)]
pub enum AdvisorError {
    /// Budget is zero, negative, not finite, or missing where utilization is needed
    #[error("Invalid budget: {reason}")]
    InvalidBudget { reason: String },

    /// Usage intensity is negative or not finite
    #[error("Invalid usage intensity {0}: must be a finite, non-negative percentage")]
    InvalidUsageIntensity(f64),

    /// Offering has no price and the strict policy is active
    #[error("No price for offering '{offering}' in slot '{slot}'")]
    UnpricedOffering { slot: String, offering: String },

    /// Request failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog or pricing table is inconsistent
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

impl AdvisorError {
    pub fn missing_budget() -> Self {
        Self::InvalidBudget {
            reason: "a budget is required to compute utilization".to_string(),
        }
    }

    pub fn non_positive_budget(budget: f64) -> Self {
        Self::InvalidBudget {
            reason: format!("{budget} is not a positive amount"),
        }
    }

    pub fn budget_too_small(budget: f64) -> Self {
        Self::InvalidBudget {
            reason: format!("{budget} is too small to compute utilization"),
        }
    }

    /// Stable identifier for callers that branch on the error
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisorError::InvalidBudget { .. } => "invalid_budget",
            AdvisorError::InvalidUsageIntensity(_) => "invalid_usage_intensity",
            AdvisorError::UnpricedOffering { .. } => "unpriced_offering",
            AdvisorError::InvalidInput(_) => "invalid_input",
            AdvisorError::InvalidCatalog(_) => "invalid_catalog",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvisorError::InvalidBudget { .. }
            | AdvisorError::InvalidUsageIntensity(_)
            | AdvisorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdvisorError::UnpricedOffering { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AdvisorError::InvalidCatalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Advisor request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
