use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::terraform::is_valid_region;

/// Version of the [`Recommendation`] wire schema
pub const RECOMMENDATION_SCHEMA_VERSION: u32 = 1;

/// Baseline usage intensity (percent)
pub const BASELINE_USAGE_INTENSITY: f64 = 100.0;

/// Hours used to derive an hourly rate from a monthly cost
pub const HOURS_PER_MONTH: f64 = 720.0;

/// Custom validator for provider regions
fn validate_region(region: &str) -> Result<(), ValidationError> {
    if !is_valid_region(region) {
        return Err(ValidationError::new("invalid_region"));
    }
    Ok(())
}

/// Workload archetype tag
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    Default,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProjectType {
    #[default]
    WebService,
    Game,
}

impl ProjectType {
    /// Resolve a free-form tag. Unknown tags map to the default archetype.
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_tag(tag).unwrap_or_default()
    }

    /// Strict variant of [`ProjectType::from_tag`]; `None` for unknown tags.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "webservice" | "web" => Some(Self::WebService),
            "game" => Some(Self::Game),
            _ => None,
        }
    }
}

/// Functional role a recommendation must fill.
///
/// Declaration order is the presentation order of a bundle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CapabilitySlot {
    Compute,
    Database,
    Storage,
    Cdn,
    Monitoring,
}

/// Currency of a pricing table
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

/// Workload signals the resolver works from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadProfile {
    pub project_type: ProjectType,
    pub expected_users: u64,
    pub budget: f64,
}

/// Offering chosen for one capability slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOffering {
    pub offering: String,
    pub reason: String,
}

/// An archetype resolved for a concrete workload: one offering per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBundle {
    pub project_type: ProjectType,
    pub archetype: String,
    pub architecture: String,
    pub slots: BTreeMap<CapabilitySlot, SelectedOffering>,
}

impl ServiceBundle {
    pub fn offering(&self, slot: CapabilitySlot) -> Option<&str> {
        self.slots.get(&slot).map(|s| s.offering.as_str())
    }
}

/// A priced service within a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    pub slot: CapabilitySlot,
    /// Display name, e.g. "EC2"
    pub service_name: String,
    /// Offering identifier, e.g. "t3.micro"
    pub instance_type: String,
    pub monthly_cost: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_cost: Option<f64>,
}

/// Per-service share of a cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCost {
    pub monthly: f64,
    pub yearly: f64,
    /// Share of the monthly total, in percent
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub total_monthly: f64,
    pub total_yearly: f64,
    pub by_service: BTreeMap<String, ServiceCost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// Offering has no entry in the pricing table; a fallback price was used
    UnpricedOffering,
}

/// Non-fatal condition attached to an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EstimateWarning {
    pub kind: WarningKind,
    pub slot: String,
    pub offering: String,
    pub fallback_unit_price: f64,
    pub message: String,
}

impl EstimateWarning {
    pub fn unpriced(slot: &str, offering: &str, fallback_unit_price: f64) -> Self {
        Self {
            kind: WarningKind::UnpricedOffering,
            slot: slot.to_string(),
            offering: offering.to_string(),
            fallback_unit_price,
            message: format!(
                "No price for offering '{offering}' ({slot}); estimated at {fallback_unit_price}"
            ),
        }
    }
}

/// A single within-family downgrade applied to fit the budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Downgrade {
    pub slot: CapabilitySlot,
    pub from: String,
    pub to: String,
    pub monthly_saving: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAdjustment {
    pub downgrades: Vec<Downgrade>,
    /// Cost of the bundle once every useful downgrade was considered
    pub minimum_monthly_cost: f64,
}

/// Input for the `recommend` operation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    /// Archetype tag ("webService", "game"); unknown tags use the default
    #[validate(length(max = 64))]
    #[serde(default)]
    pub project_type: Option<String>,
    /// Free-form project description, used when no project type is given
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_expected_users")]
    pub expected_users: u64,
    /// Monthly budget in currency units
    #[serde(default)]
    pub budget: Option<f64>,
    /// Load scaling in percent; 100 is baseline
    #[serde(default = "default_usage_intensity")]
    pub usage_intensity: f64,
    #[serde(default)]
    pub optimize_for_budget: bool,
    #[serde(default)]
    pub include_terraform: bool,
    #[validate(length(min = 1, max = 32), custom(function = "validate_region"))]
    #[serde(default)]
    pub region: Option<String>,
}

impl RecommendRequest {
    pub fn new(project_type: &str, expected_users: u64, budget: f64) -> Self {
        Self {
            project_type: Some(project_type.to_string()),
            description: None,
            expected_users,
            budget: Some(budget),
            usage_intensity: BASELINE_USAGE_INTENSITY,
            optimize_for_budget: false,
            include_terraform: false,
            region: None,
        }
    }

    pub fn from_description(description: &str, expected_users: u64, budget: f64) -> Self {
        Self {
            project_type: None,
            description: Some(description.to_string()),
            ..Self::new("", expected_users, budget)
        }
    }
}

/// Input for the `estimateCost` operation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EstimateCostRequest {
    /// Slot (or service) name → offering id, e.g. {"compute": "t3.micro"}
    #[validate(length(min = 1, max = 32))]
    pub services: BTreeMap<String, String>,
    #[serde(default = "default_usage_intensity")]
    #[serde(alias = "usage")]
    pub usage_intensity: f64,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Recommended bundle with its costing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub schema_version: u32,
    pub project_type: ProjectType,
    pub archetype: String,
    pub expected_users: u64,
    pub budget: f64,
    pub usage_intensity: f64,
    pub currency: Currency,
    pub services: Vec<ServiceDetail>,
    pub architecture: String,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_utilization: Option<f64>,
    pub within_budget: bool,
    pub cost_breakdown: CostBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_adjustment: Option<BudgetAdjustment>,
    #[serde(default)]
    pub warnings: Vec<EstimateWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_config: Option<String>,
}

/// Result of the `estimateCost` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Scaled monthly cost, rounded to whole currency units
    pub estimated_monthly_cost: f64,
    /// Unscaled sum of unit prices
    pub baseline_cost: f64,
    pub usage_intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_utilization: Option<f64>,
    #[serde(default)]
    pub warnings: Vec<EstimateWarning>,
}

fn default_expected_users() -> u64 {
    100
}

fn default_usage_intensity() -> f64 {
    BASELINE_USAGE_INTENSITY
}
