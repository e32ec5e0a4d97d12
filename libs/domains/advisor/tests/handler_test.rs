//! Handler tests for the advisor domain
//!
//! Exercise the axum router directly: JSON in, JSON out, status codes and
//! error bodies.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_advisor::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> axum::Router {
    app_with(EngineConfig::default())
}

fn app_with(config: EngineConfig) -> axum::Router {
    let service =
        AdvisorService::new(Catalog::aws_default(), PricingTable::aws_default(), config).unwrap();
    handlers::router(service)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_recommend_returns_bundle() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({ "projectType": "webService", "expectedUsers": 500, "budget": 100 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["schemaVersion"], 1);
    assert_eq!(body["projectType"], "webService");
    assert_eq!(body["services"].as_array().unwrap().len(), 5);
    assert_eq!(body["services"][0]["slot"], "compute");
    assert_eq!(body["services"][0]["instanceType"], "t3.micro");
    assert!(body["costBreakdown"]["byService"]["EC2"].is_object());
    assert!(body.get("terraformConfig").is_none());
}

#[tokio::test]
async fn test_recommend_deserializes_into_typed_model() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({ "projectType": "game", "expectedUsers": 5000, "budget": 200 }),
        ))
        .await
        .unwrap();

    let recommendation: Recommendation = json_body(response.into_body()).await;
    assert_eq!(recommendation.project_type, ProjectType::Game);
    assert!(recommendation.within_budget);
    assert_eq!(recommendation.currency, Currency::Usd);
}

#[tokio::test]
async fn test_recommend_zero_budget_returns_400() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({ "projectType": "game", "expectedUsers": 10, "budget": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_budget");
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("budget"));
}

#[tokio::test]
async fn test_recommend_negative_usage_returns_400() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({ "projectType": "webService", "budget": 50, "usageIntensity": -5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_usage_intensity");
}

#[tokio::test]
async fn test_recommend_tiny_budget_returns_400() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({ "projectType": "webService", "expectedUsers": 10, "budget": 1e-320 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_budget");
}

#[tokio::test]
async fn test_recommend_malformed_region_returns_400() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({
                "projectType": "webService",
                "budget": 100,
                "includeTerraform": true,
                "region": "x\"}\nresource \"a\" \"b\" {#"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_input");
    assert!(body.get("terraformConfig").is_none());
}

#[tokio::test]
async fn test_recommend_with_terraform_and_optimization() {
    let response = app()
        .oneshot(post_json(
            "/recommend",
            json!({
                "projectType": "webService",
                "expectedUsers": 500,
                "budget": 23,
                "optimizeForBudget": true,
                "includeTerraform": true,
                "region": "ap-northeast-2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["budgetAdjustment"]["downgrades"][0]["to"], "t3.nano");
    assert!(
        body["terraformConfig"]
            .as_str()
            .unwrap()
            .contains("ap-northeast-2")
    );
}

#[tokio::test]
async fn test_estimate_returns_rounded_cost() {
    let response = app()
        .oneshot(post_json(
            "/estimate",
            json!({ "services": { "compute": "t3.micro", "storage": "s3-standard" }, "usage": 100 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let estimate: CostEstimate = json_body(response.into_body()).await;
    assert_eq!(estimate.estimated_monthly_cost, 9.0);
    assert!(estimate.warnings.is_empty());
}

#[tokio::test]
async fn test_estimate_overflowing_usage_returns_400() {
    let response = app()
        .oneshot(post_json(
            "/estimate",
            json!({ "services": { "compute": "t3.micro" }, "usageIntensity": 1e308, "budget": 100 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_usage_intensity");
}

#[tokio::test]
async fn test_estimate_unknown_offering_returns_warning() {
    let response = app()
        .oneshot(post_json(
            "/estimate",
            json!({ "services": { "compute": "m7i.large" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["estimatedMonthlyCost"], 10.0);
    assert_eq!(body["warnings"][0]["kind"], "unpricedOffering");
    assert_eq!(body["warnings"][0]["offering"], "m7i.large");
}

#[tokio::test]
async fn test_estimate_strict_policy_returns_422() {
    let app = app_with(EngineConfig {
        missing_price_policy: MissingPricePolicy::Strict,
        ..EngineConfig::default()
    });

    let response = app
        .oneshot(post_json(
            "/estimate",
            json!({ "services": { "compute": "m7i.large" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "unpriced_offering");
}

#[tokio::test]
async fn test_estimate_empty_services_returns_400() {
    let response = app()
        .oneshot(post_json("/estimate", json!({ "services": {} })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_catalog_lists_archetypes_and_prices() {
    let request = Request::builder()
        .method("GET")
        .uri("/catalog")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view: CatalogView = json_body(response.into_body()).await;
    assert_eq!(view.archetypes.len(), 2);
    assert!(
        view.offerings
            .iter()
            .any(|o| o.id == "cloudfront" && o.unit_price == Some(0.085))
    );
}
