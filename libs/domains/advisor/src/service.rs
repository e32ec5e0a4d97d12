use observability::AdvisorMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use validator::Validate;

use crate::catalog::{Catalog, CatalogView};
use crate::classifier::classify;
use crate::error::{AdvisorError, AdvisorResult};
use crate::estimator::{CostEstimator, require_budget, require_usage_intensity};
use crate::models::{
    CostEstimate, EstimateCostRequest, EstimateWarning, ProjectType, RECOMMENDATION_SCHEMA_VERSION,
    RecommendRequest, Recommendation, WorkloadProfile,
};
use crate::optimizer::BudgetOptimizer;
use crate::pricing::{DEFAULT_FALLBACK_UNIT_PRICE, MissingPricePolicy, PriceSource, PricingTable};
use crate::resolver::CatalogResolver;
use crate::terraform::{self, DEFAULT_REGION};

/// Engine behaviour that is not part of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub missing_price_policy: MissingPricePolicy,
    pub fallback_unit_price: f64,
    /// Region used for Terraform output when a request names none
    pub default_region: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            missing_price_policy: MissingPricePolicy::default(),
            fallback_unit_price: DEFAULT_FALLBACK_UNIT_PRICE,
            default_region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Recommendation and estimation entry point
pub struct AdvisorService<P: PriceSource = PricingTable> {
    catalog: Arc<Catalog>,
    prices: Arc<P>,
    config: EngineConfig,
    resolver: CatalogResolver,
    estimator: CostEstimator<P>,
    optimizer: BudgetOptimizer<P>,
}

impl<P: PriceSource> AdvisorService<P> {
    /// Build a service, rejecting catalogs with gaps or unpriced offerings
    pub fn new(catalog: Catalog, prices: P, config: EngineConfig) -> AdvisorResult<Self> {
        if !config.fallback_unit_price.is_finite() || config.fallback_unit_price < 0.0 {
            return Err(AdvisorError::InvalidCatalog(format!(
                "fallback unit price {} must be a finite, non-negative amount",
                config.fallback_unit_price
            )));
        }
        if !terraform::is_valid_region(&config.default_region) {
            return Err(AdvisorError::InvalidCatalog(format!(
                "default region '{}' is not a valid region name",
                config.default_region
            )));
        }
        catalog.validate(&prices)?;

        let catalog = Arc::new(catalog);
        let prices = Arc::new(prices);

        info!(
            archetypes = catalog.archetypes.len(),
            offerings = catalog.offerings.len(),
            policy = %config.missing_price_policy,
            "Advisor catalog loaded"
        );
        AdvisorMetrics::set_catalog_size(catalog.offerings.len());

        Ok(Self {
            resolver: CatalogResolver::new(Arc::clone(&catalog)),
            estimator: CostEstimator::new(
                Arc::clone(&prices),
                Arc::clone(&catalog),
                config.missing_price_policy,
                config.fallback_unit_price,
            ),
            optimizer: BudgetOptimizer::new(Arc::clone(&prices), Arc::clone(&catalog)),
            catalog,
            prices,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pricing(&self) -> &P {
        &self.prices
    }

    pub fn catalog_view(&self) -> CatalogView {
        CatalogView::new(&self.catalog, self.prices.as_ref())
    }

    /// Resolve, price and summarize a bundle for the request
    #[instrument(
        skip(self, request),
        fields(project_type = ?request.project_type, expected_users = request.expected_users)
    )]
    pub fn recommend(&self, request: RecommendRequest) -> AdvisorResult<Recommendation> {
        let started = Instant::now();
        let result = self.build_recommendation(request);

        match &result {
            Ok(recommendation) => {
                let project_type = recommendation.project_type.to_string();
                AdvisorMetrics::record_recommendation(&project_type, started.elapsed());
                if let Some(utilization) = recommendation.budget_utilization {
                    AdvisorMetrics::record_budget_utilization(&project_type, utilization);
                }
                record_warnings(&recommendation.warnings);
            }
            Err(err) => AdvisorMetrics::record_rejected("recommend", err.kind()),
        }

        result
    }

    fn build_recommendation(&self, request: RecommendRequest) -> AdvisorResult<Recommendation> {
        request
            .validate()
            .map_err(|e| AdvisorError::InvalidInput(e.to_string()))?;
        let budget = require_budget(request.budget)?;
        let usage_intensity = require_usage_intensity(request.usage_intensity)?;

        let project_type = self.project_type_for(&request);
        let profile = WorkloadProfile {
            project_type,
            expected_users: request.expected_users,
            budget,
        };

        let mut bundle = self.resolver.resolve(&profile)?;

        let budget_adjustment = if request.optimize_for_budget {
            let adjustment = self
                .optimizer
                .fit_to_budget(&mut bundle, usage_intensity, budget);
            if let Some(adjustment) = &adjustment {
                for downgrade in &adjustment.downgrades {
                    AdvisorMetrics::record_downgrades(&downgrade.slot.to_string(), 1);
                }
            }
            adjustment
        } else {
            None
        };

        let (services, warnings) = self.estimator.price_bundle(&bundle, usage_intensity)?;
        let summary = self.estimator.summarize(&services, Some(budget))?;

        let terraform_config = request.include_terraform.then(|| {
            let region = request
                .region
                .as_deref()
                .unwrap_or(self.config.default_region.as_str());
            terraform::render(&services, region)
        });

        info!(
            project_type = %bundle.project_type,
            archetype = %bundle.archetype,
            total_cost = summary.total_cost,
            budget_utilization = ?summary.budget_utilization,
            "Recommendation ready"
        );

        Ok(Recommendation {
            schema_version: RECOMMENDATION_SCHEMA_VERSION,
            project_type: bundle.project_type,
            archetype: bundle.archetype,
            expected_users: request.expected_users,
            budget,
            usage_intensity,
            currency: self.prices.currency(),
            services,
            architecture: bundle.architecture,
            total_cost: summary.total_cost,
            budget_utilization: summary.budget_utilization,
            within_budget: summary.total_cost <= budget,
            cost_breakdown: summary.breakdown,
            budget_adjustment,
            warnings,
            terraform_config,
        })
    }

    /// An explicit project type wins over the description
    fn project_type_for(&self, request: &RecommendRequest) -> ProjectType {
        if let Some(tag) = request
            .project_type
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
        {
            return ProjectType::from_tag(tag);
        }

        match request.description.as_deref() {
            Some(description) => {
                let classification = classify(description);
                info!(
                    project_type = %classification.project_type,
                    keyword = ?classification.matched_keyword,
                    "Classified project description"
                );
                classification.project_type
            }
            None => ProjectType::default(),
        }
    }

    /// Estimate an arbitrary slot → offering mapping
    #[instrument(skip(self, request), fields(services = request.services.len()))]
    pub fn estimate_cost(&self, request: EstimateCostRequest) -> AdvisorResult<CostEstimate> {
        let result = request
            .validate()
            .map_err(|e| AdvisorError::InvalidInput(e.to_string()))
            .and_then(|_| {
                self.estimator
                    .estimate(&request.services, request.usage_intensity, request.budget)
            });

        match &result {
            Ok(estimate) => {
                AdvisorMetrics::record_estimate(request.services.len());
                record_warnings(&estimate.warnings);
            }
            Err(err) => AdvisorMetrics::record_rejected("estimate", err.kind()),
        }

        result
    }
}

fn record_warnings(warnings: &[EstimateWarning]) {
    for warning in warnings {
        AdvisorMetrics::record_unpriced_offering(&warning.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::round_to;
    use crate::models::CapabilitySlot;
    use crate::pricing::MockPriceSource;

    fn service() -> AdvisorService {
        AdvisorService::new(
            Catalog::aws_default(),
            PricingTable::aws_default(),
            EngineConfig::default(),
        )
        .unwrap()
    }

    fn estimate_request(pairs: &[(&str, &str)]) -> EstimateCostRequest {
        EstimateCostRequest {
            services: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            usage_intensity: 100.0,
            budget: None,
        }
    }

    #[test]
    fn test_small_web_service() {
        let recommendation = service()
            .recommend(RecommendRequest::new("webService", 500, 100.0))
            .unwrap();

        let compute = recommendation
            .services
            .iter()
            .find(|s| s.slot == CapabilitySlot::Compute)
            .unwrap();
        assert_eq!(compute.instance_type, "t3.micro");
        assert_eq!(recommendation.services.len(), 5);
        assert!(recommendation.within_budget);
        assert!(recommendation.budget_adjustment.is_none());
        assert!(recommendation.terraform_config.is_none());
    }

    #[test]
    fn test_game_with_budget() {
        let recommendation = service()
            .recommend(RecommendRequest::new("game", 5_000, 200.0))
            .unwrap();

        let names: Vec<_> = recommendation
            .services
            .iter()
            .map(|s| s.service_name.as_str())
            .collect();
        assert!(names.contains(&"DynamoDB"));
        assert!(names.iter().any(|n| n.contains("GameLift")));
        assert!(names.iter().any(|n| n.contains("X-Ray")));

        let expected = round_to(100.0 * recommendation.total_cost / 200.0, 1);
        assert_eq!(recommendation.budget_utilization, Some(expected));
        assert_eq!(recommendation.schema_version, RECOMMENDATION_SCHEMA_VERSION);
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        let err = service()
            .recommend(RecommendRequest::new("webService", 10, 0.0))
            .unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidBudget { .. }));
    }

    #[test]
    fn test_missing_budget_is_rejected() {
        let mut request = RecommendRequest::new("game", 10, 1.0);
        request.budget = None;
        assert_eq!(service().recommend(request).unwrap_err().kind(), "invalid_budget");
    }

    #[test]
    fn test_over_budget_is_reported_not_clamped() {
        let recommendation = service()
            .recommend(RecommendRequest::new("game", 10, 50.0))
            .unwrap();
        assert!(!recommendation.within_budget);
        assert!(recommendation.budget_utilization.unwrap() > 100.0);
    }

    #[test]
    fn test_explicit_project_type_wins_over_description() {
        let mut request = RecommendRequest::new("webService", 10, 100.0);
        request.description = Some("multiplayer game".to_string());
        let recommendation = service().recommend(request).unwrap();
        assert_eq!(recommendation.project_type, ProjectType::WebService);
    }

    #[test]
    fn test_description_selects_archetype() {
        let recommendation = service()
            .recommend(RecommendRequest::from_description(
                "모바일 게임 백엔드",
                2_000,
                150.0,
            ))
            .unwrap();
        assert_eq!(recommendation.project_type, ProjectType::Game);
    }

    #[test]
    fn test_optimize_for_budget_downgrades() {
        let mut request = RecommendRequest::new("webService", 500, 23.0);
        request.optimize_for_budget = true;
        let recommendation = service().recommend(request).unwrap();

        let adjustment = recommendation.budget_adjustment.unwrap();
        assert_eq!(adjustment.downgrades[0].to, "t3.nano");
        assert!(recommendation.within_budget);
        assert_eq!(recommendation.total_cost, adjustment.minimum_monthly_cost);
    }

    #[test]
    fn test_terraform_uses_default_region() {
        let mut request = RecommendRequest::new("webService", 500, 100.0);
        request.include_terraform = true;
        let terraform = service().recommend(request).unwrap().terraform_config.unwrap();
        assert!(terraform.contains("region = \"us-east-1\""));
        assert!(terraform.contains("aws_db_instance"));
    }

    #[test]
    fn test_terraform_region_cannot_inject_resources() {
        let mut request = RecommendRequest::new("webService", 500, 100.0);
        request.include_terraform = true;
        request.region = Some("x\"}\nresource \"a\" \"b\" {#".to_string());
        let err = service().recommend(request).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_tiny_budget_is_rejected() {
        let err = service()
            .recommend(RecommendRequest::new("webService", 10, 1e-320))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_budget");
    }

    #[test]
    fn test_overflowing_usage_intensity_is_rejected() {
        let mut request = estimate_request(&[("compute", "t3.micro")]);
        request.usage_intensity = 1e308;
        request.budget = Some(100.0);
        let err = service().estimate_cost(request).unwrap_err();
        assert_eq!(err.kind(), "invalid_usage_intensity");
    }

    #[test]
    fn test_estimate_cost() {
        let estimate = service()
            .estimate_cost(estimate_request(&[
                ("compute", "t3.micro"),
                ("storage", "s3-standard"),
            ]))
            .unwrap();
        assert_eq!(estimate.estimated_monthly_cost, 9.0);
    }

    #[test]
    fn test_estimate_cost_validates_request() {
        let err = service().estimate_cost(estimate_request(&[])).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_strict_policy_surfaces_unpriced_offering() {
        let service = AdvisorService::new(
            Catalog::aws_default(),
            PricingTable::aws_default(),
            EngineConfig {
                missing_price_policy: MissingPricePolicy::Strict,
                ..EngineConfig::default()
            },
        )
        .unwrap();

        let err = service
            .estimate_cost(estimate_request(&[("compute", "c7g.large")]))
            .unwrap_err();
        assert_eq!(err.kind(), "unpriced_offering");
    }

    #[test]
    fn test_catalog_must_be_fully_priced() {
        let prices = PricingTable::new(
            crate::models::Currency::Usd,
            [("t3.micro".to_string(), 8.5)],
        )
        .unwrap();
        let result = AdvisorService::new(Catalog::aws_default(), prices, EngineConfig::default());
        assert!(matches!(result, Err(AdvisorError::InvalidCatalog(_))));
    }

    #[test]
    fn test_rejects_negative_fallback_price() {
        let result = AdvisorService::new(
            Catalog::aws_default(),
            PricingTable::aws_default(),
            EngineConfig {
                fallback_unit_price: -1.0,
                ..EngineConfig::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_malformed_default_region() {
        let result = AdvisorService::new(
            Catalog::aws_default(),
            PricingTable::aws_default(),
            EngineConfig {
                default_region: "us-east-1\"}".to_string(),
                ..EngineConfig::default()
            },
        );
        assert!(matches!(result, Err(AdvisorError::InvalidCatalog(_))));
    }

    #[test]
    fn test_recommend_with_mocked_prices() {
        let mut prices = MockPriceSource::new();
        prices.expect_unit_price().returning(|_| Some(10.0));
        prices
            .expect_currency()
            .return_const(crate::models::Currency::Eur);

        let service =
            AdvisorService::new(Catalog::aws_default(), prices, EngineConfig::default()).unwrap();
        let recommendation = service
            .recommend(RecommendRequest::new("game", 1, 100.0))
            .unwrap();

        assert_eq!(recommendation.total_cost, 50.0);
        assert_eq!(recommendation.budget_utilization, Some(50.0));
        assert_eq!(recommendation.currency, crate::models::Currency::Eur);
        assert_eq!(recommendation.cost_breakdown.total_yearly, 600.0);
    }

    #[test]
    fn test_catalog_view_lists_every_offering() {
        let service = service();
        let view = service.catalog_view();
        assert_eq!(view.offerings.len(), service.catalog().offerings.len());
        assert!(view.offerings.iter().all(|o| o.unit_price.is_some()));
        assert_eq!(service.pricing().len(), view.offerings.len());
    }
}
