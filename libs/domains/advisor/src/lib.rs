//! Advisor Domain
//!
//! Recommends a cloud service bundle for a workload and estimates its
//! monthly cost against a budget.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← axum routes, OpenAPI
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Service    │  ← validation, classification, orchestration
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┬──────────────┬──────────────┐
//! │   Resolver   │  Estimator   │  Optimizer   │
//! └──────┬───────┴──────┬───────┴──────────────┘
//!        │              │
//! ┌──────▼───────┐ ┌────▼─────────┐
//! │   Catalog    │ │ PriceSource  │  ← immutable, shared behind Arc
//! └──────────────┘ └──────────────┘
//! ```

pub mod catalog;
pub mod classifier;
pub mod error;
pub mod estimator;
pub mod handlers;
pub mod models;
pub mod optimizer;
pub mod pricing;
pub mod resolver;
pub mod service;
pub mod terraform;

pub use catalog::{Archetype, CapacityTier, Catalog, CatalogView, OfferingProfile, SlotPlan};
pub use classifier::{Classification, classify};
pub use error::{AdvisorError, AdvisorResult};
pub use estimator::{CostEstimator, CostSummary};
pub use models::{
    CapabilitySlot, CostBreakdown, CostEstimate, Currency, EstimateCostRequest, EstimateWarning,
    ProjectType, RecommendRequest, Recommendation, ServiceBundle, ServiceDetail, WorkloadProfile,
};
pub use optimizer::BudgetOptimizer;
pub use pricing::{MissingPricePolicy, PriceSource, PricingTable};
pub use resolver::CatalogResolver;
pub use service::{AdvisorService, EngineConfig};
