//! Budget optimizer
//!
//! Swaps offerings for cheaper ones from the same service family until the
//! bundle fits the budget or no cheaper option is left. Slots are visited in
//! [`CapabilitySlot`] declaration order.

use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::estimator::round_to;
use crate::models::{
    BASELINE_USAGE_INTENSITY, BudgetAdjustment, CapabilitySlot, Downgrade, ServiceBundle,
};
use crate::pricing::PriceSource;

pub struct BudgetOptimizer<P: PriceSource> {
    prices: Arc<P>,
    catalog: Arc<Catalog>,
}

impl<P: PriceSource> BudgetOptimizer<P> {
    pub fn new(prices: Arc<P>, catalog: Arc<Catalog>) -> Self {
        Self { prices, catalog }
    }

    fn monthly_cost(&self, offering: &str, usage_intensity: f64) -> Option<f64> {
        self.prices
            .unit_price(offering)
            .map(|price| round_to(price * usage_intensity / BASELINE_USAGE_INTENSITY, 2))
    }

    /// Downgrade `bundle` in place. Returns `None` when the bundle already
    /// fits and nothing was considered.
    pub fn fit_to_budget(
        &self,
        bundle: &mut ServiceBundle,
        usage_intensity: f64,
        budget: f64,
    ) -> Option<BudgetAdjustment> {
        let mut total: f64 = bundle
            .slots
            .values()
            .filter_map(|s| self.monthly_cost(&s.offering, usage_intensity))
            .sum();

        if total <= budget {
            return None;
        }

        let mut downgrades = Vec::new();

        for slot in CapabilitySlot::iter() {
            if total <= budget {
                break;
            }

            let Some(selected) = bundle.slots.get_mut(&slot) else {
                continue;
            };
            let current = selected.offering.clone();
            let Some(current_cost) = self.monthly_cost(&current, usage_intensity) else {
                continue;
            };

            let candidates: Vec<(&str, f64)> = self
                .catalog
                .family_alternatives(&current)
                .filter_map(|id| {
                    self.monthly_cost(id, usage_intensity)
                        .filter(|cost| *cost < current_cost)
                        .map(|cost| (id, cost))
                })
                .collect();

            let fitting = candidates
                .iter()
                .filter(|(_, cost)| total - current_cost + cost <= budget)
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let cheapest = candidates.iter().min_by(|a, b| a.1.total_cmp(&b.1));

            let Some(&(to, cost)) = fitting.or(cheapest) else {
                debug!(slot = %slot, offering = %current, "No cheaper alternative");
                continue;
            };

            let saving = current_cost - cost;
            total -= saving;
            selected.offering = to.to_string();
            downgrades.push(Downgrade {
                slot,
                from: current.clone(),
                to: to.to_string(),
                monthly_saving: round_to(saving, 2),
            });
        }

        let minimum_monthly_cost = round_to(total, 2);
        info!(
            budget,
            minimum_monthly_cost,
            downgrades = downgrades.len(),
            "Applied budget downgrades"
        );

        Some(BudgetAdjustment {
            downgrades,
            minimum_monthly_cost,
        })
    }
}
