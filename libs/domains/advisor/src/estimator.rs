//! Cost estimator
//!
//! Turns offerings and a usage intensity into monthly costs, and priced
//! services plus a budget into totals, a breakdown and budget utilization.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::{AdvisorError, AdvisorResult};
use crate::models::{
    BASELINE_USAGE_INTENSITY, CostBreakdown, CostEstimate, EstimateWarning, HOURS_PER_MONTH,
    ServiceBundle, ServiceCost, ServiceDetail,
};
use crate::pricing::{MissingPricePolicy, PriceSource};

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Budget must be present, finite and strictly positive
pub fn require_budget(budget: Option<f64>) -> AdvisorResult<f64> {
    match budget {
        None => Err(AdvisorError::missing_budget()),
        Some(b) if b.is_finite() && b > 0.0 => Ok(b),
        Some(b) => Err(AdvisorError::non_positive_budget(b)),
    }
}

pub fn require_usage_intensity(usage_intensity: f64) -> AdvisorResult<f64> {
    if usage_intensity.is_finite() && usage_intensity >= 0.0 {
        Ok(usage_intensity)
    } else {
        Err(AdvisorError::InvalidUsageIntensity(usage_intensity))
    }
}

/// `total / budget` as a percentage with one decimal. Not capped at 100.
pub fn budget_utilization(total: f64, budget: f64) -> AdvisorResult<f64> {
    let budget = require_budget(Some(budget))?;
    let utilization = round_to(100.0 * total / budget, 1);
    if !utilization.is_finite() {
        return Err(AdvisorError::budget_too_small(budget));
    }
    Ok(utilization)
}

/// Scale a baseline cost, rejecting intensities that overflow it
fn scale(baseline: f64, usage_intensity: f64) -> AdvisorResult<f64> {
    let scaled = baseline * usage_intensity / BASELINE_USAGE_INTENSITY;
    if scaled.is_finite() {
        Ok(scaled)
    } else {
        Err(AdvisorError::InvalidUsageIntensity(usage_intensity))
    }
}

/// Totals for a list of priced services
#[derive(Debug, Clone, PartialEq)]
pub struct CostSummary {
    pub total_cost: f64,
    pub budget_utilization: Option<f64>,
    pub breakdown: CostBreakdown,
}

pub struct CostEstimator<P: PriceSource> {
    prices: Arc<P>,
    catalog: Arc<Catalog>,
    policy: MissingPricePolicy,
    fallback_unit_price: f64,
}

impl<P: PriceSource> CostEstimator<P> {
    pub fn new(
        prices: Arc<P>,
        catalog: Arc<Catalog>,
        policy: MissingPricePolicy,
        fallback_unit_price: f64,
    ) -> Self {
        Self {
            prices,
            catalog,
            policy,
            fallback_unit_price,
        }
    }

    /// Unit price, applying the missing-price policy
    fn unit_price(
        &self,
        slot: &str,
        offering: &str,
        warnings: &mut Vec<EstimateWarning>,
    ) -> AdvisorResult<f64> {
        if let Some(price) = self.prices.unit_price(offering) {
            return Ok(price);
        }

        match self.policy {
            MissingPricePolicy::Strict => Err(AdvisorError::UnpricedOffering {
                slot: slot.to_string(),
                offering: offering.to_string(),
            }),
            MissingPricePolicy::Fallback => {
                warn!(
                    slot,
                    offering,
                    fallback_unit_price = self.fallback_unit_price,
                    "Offering not priced, using fallback unit price"
                );
                warnings.push(EstimateWarning::unpriced(
                    slot,
                    offering,
                    self.fallback_unit_price,
                ));
                Ok(self.fallback_unit_price)
            }
        }
    }

    /// Unrounded monthly cost of a mapping at the given intensity, plus the
    /// baseline sum and any pricing warnings.
    pub fn scaled_cost(
        &self,
        offerings: &BTreeMap<String, String>,
        usage_intensity: f64,
    ) -> AdvisorResult<(f64, f64, Vec<EstimateWarning>)> {
        let usage_intensity = require_usage_intensity(usage_intensity)?;

        let mut warnings = Vec::new();
        let mut baseline = 0.0;
        for (slot, offering) in offerings {
            baseline += self.unit_price(slot, offering, &mut warnings)?;
        }

        let scaled = scale(baseline, usage_intensity)?;
        Ok((baseline, scaled, warnings))
    }

    /// Estimate a slot → offering mapping, rounded to whole currency units
    pub fn estimate(
        &self,
        offerings: &BTreeMap<String, String>,
        usage_intensity: f64,
        budget: Option<f64>,
    ) -> AdvisorResult<CostEstimate> {
        // Fail on a bad budget before doing any pricing work
        let budget = budget.map(|b| require_budget(Some(b))).transpose()?;

        let (baseline, scaled, warnings) = self.scaled_cost(offerings, usage_intensity)?;
        let estimated_monthly_cost = scaled.round();

        let budget_utilization = budget
            .map(|b| budget_utilization(estimated_monthly_cost, b))
            .transpose()?;

        Ok(CostEstimate {
            estimated_monthly_cost,
            baseline_cost: baseline,
            usage_intensity,
            budget_utilization,
            warnings,
        })
    }

    /// Per-service details for a resolved bundle. Monthly costs carry two
    /// decimals.
    pub fn price_bundle(
        &self,
        bundle: &ServiceBundle,
        usage_intensity: f64,
    ) -> AdvisorResult<(Vec<ServiceDetail>, Vec<EstimateWarning>)> {
        let usage_intensity = require_usage_intensity(usage_intensity)?;
        let mut warnings = Vec::new();

        let services = bundle
            .slots
            .iter()
            .map(|(slot, selected)| {
                let slot_name = slot.to_string();
                let unit_price = self.unit_price(&slot_name, &selected.offering, &mut warnings)?;
                let monthly_cost = round_to(scale(unit_price, usage_intensity)?, 2);
                if !monthly_cost.is_finite() {
                    return Err(AdvisorError::InvalidUsageIntensity(usage_intensity));
                }

                let (service_name, instance_type, description) =
                    match self.catalog.offering(&selected.offering) {
                        Some(profile) => (
                            profile.service_name.clone(),
                            profile.instance_type.clone(),
                            profile.description.clone(),
                        ),
                        None => (
                            selected.offering.clone(),
                            selected.offering.clone(),
                            "Cloud service".to_string(),
                        ),
                    };

                Ok(ServiceDetail {
                    slot: *slot,
                    service_name,
                    instance_type,
                    monthly_cost,
                    description,
                    reason: Some(selected.reason.clone()),
                    hourly_cost: Some(round_to(monthly_cost / HOURS_PER_MONTH, 4)),
                })
            })
            .collect::<AdvisorResult<Vec<_>>>()?;

        Ok((services, warnings))
    }

    /// Totals, breakdown and, when a budget is given, utilization
    pub fn summarize(
        &self,
        services: &[ServiceDetail],
        budget: Option<f64>,
    ) -> AdvisorResult<CostSummary> {
        summarize(services, budget)
    }
}

/// Totals, breakdown and, when a budget is given, utilization for priced
/// services. Needs no price lookups.
pub fn summarize(services: &[ServiceDetail], budget: Option<f64>) -> AdvisorResult<CostSummary> {
    let total_cost = round_to(services.iter().map(|s| s.monthly_cost).sum(), 2);
    if !total_cost.is_finite() {
        return Err(AdvisorError::InvalidInput(
            "total monthly cost is not a finite amount".to_string(),
        ));
    }

    let budget_utilization = budget
        .map(|b| budget_utilization(total_cost, b))
        .transpose()?;

    let mut by_service: BTreeMap<String, f64> = BTreeMap::new();
    for service in services {
        *by_service.entry(service.service_name.clone()).or_default() += service.monthly_cost;
    }

    let by_service = by_service
        .into_iter()
        .map(|(name, monthly)| {
            let monthly = round_to(monthly, 2);
            let percentage = if total_cost > 0.0 {
                round_to(monthly / total_cost * 100.0, 1)
            } else {
                0.0
            };
            (
                name,
                ServiceCost {
                    monthly,
                    yearly: monthly * 12.0,
                    percentage,
                },
            )
        })
        .collect();

    Ok(CostSummary {
        total_cost,
        budget_utilization,
        breakdown: CostBreakdown {
            total_monthly: total_cost,
            total_yearly: total_cost * 12.0,
            by_service,
        },
    })
}
