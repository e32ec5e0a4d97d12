//! HTTP handlers for the advisor domain

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::catalog::{Archetype, CapacityTier, CatalogView, OfferingProfile, PricedOffering, SlotPlan};
use crate::classifier::Classification;
use crate::error::AdvisorResult;
use crate::models::{
    BudgetAdjustment, CapabilitySlot, CostBreakdown, CostEstimate, Currency, Downgrade,
    EstimateCostRequest, EstimateWarning, ProjectType, RecommendRequest, Recommendation,
    ServiceCost, ServiceDetail, WarningKind,
};
use crate::pricing::PriceSource;
use crate::service::AdvisorService;

const TAG: &str = "advisor";

/// OpenAPI documentation for the advisor API
#[derive(OpenApi)]
#[openapi(
    paths(recommend, estimate, catalog),
    components(schemas(
        RecommendRequest,
        Recommendation,
        EstimateCostRequest,
        CostEstimate,
        CatalogView,
        PricedOffering,
        Archetype,
        SlotPlan,
        CapacityTier,
        OfferingProfile,
        ServiceDetail,
        ServiceCost,
        CostBreakdown,
        BudgetAdjustment,
        Downgrade,
        EstimateWarning,
        WarningKind,
        CapabilitySlot,
        ProjectType,
        Currency,
        Classification,
    )),
    tags((name = TAG, description = "Service bundle recommendations and cost estimates"))
)]
pub struct ApiDoc;

/// Router with the advisor endpoints, to be nested under `/api/advisor`
pub fn router<P: PriceSource + 'static>(service: AdvisorService<P>) -> Router {
    Router::new()
        .route("/recommend", post(recommend::<P>))
        .route("/estimate", post(estimate::<P>))
        .route("/catalog", get(catalog::<P>))
        .with_state(Arc::new(service))
}

/// Recommend a priced service bundle
#[utoipa::path(
    post,
    path = "/recommend",
    tag = TAG,
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Recommended bundle", body = Recommendation),
        (status = 400, description = "Invalid budget, usage intensity or request"),
        (status = 422, description = "Offering has no price (strict policy)")
    )
)]
async fn recommend<P: PriceSource>(
    State(service): State<Arc<AdvisorService<P>>>,
    Json(request): Json<RecommendRequest>,
) -> AdvisorResult<Json<Recommendation>> {
    let recommendation = service.recommend(request)?;
    Ok(Json(recommendation))
}

/// Estimate the monthly cost of a slot → offering mapping
#[utoipa::path(
    post,
    path = "/estimate",
    tag = TAG,
    request_body = EstimateCostRequest,
    responses(
        (status = 200, description = "Monthly cost estimate", body = CostEstimate),
        (status = 400, description = "Invalid budget, usage intensity or request"),
        (status = 422, description = "Offering has no price (strict policy)")
    )
)]
async fn estimate<P: PriceSource>(
    State(service): State<Arc<AdvisorService<P>>>,
    Json(request): Json<EstimateCostRequest>,
) -> AdvisorResult<Json<CostEstimate>> {
    let estimate = service.estimate_cost(request)?;
    Ok(Json(estimate))
}

/// Archetypes and priced offerings currently loaded
#[utoipa::path(
    get,
    path = "/catalog",
    tag = TAG,
    responses(
        (status = 200, description = "Loaded catalog", body = CatalogView)
    )
)]
async fn catalog<P: PriceSource>(
    State(service): State<Arc<AdvisorService<P>>>,
) -> Json<CatalogView> {
    Json(service.catalog_view())
}
