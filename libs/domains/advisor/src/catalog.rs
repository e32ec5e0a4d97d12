//! Service catalog
//!
//! Archetypes map every capability slot to an ordered capacity ladder of
//! offerings. Offering profiles carry the display data for each offering id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::{AdvisorError, AdvisorResult};
use crate::models::{CapabilitySlot, Currency, ProjectType};
use crate::pricing::PriceSource;

/// Offering selected once `expected_users >= min_users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CapacityTier {
    /// Inclusive lower bound on expected users
    pub min_users: u64,
    pub offering: String,
}

impl CapacityTier {
    pub fn new(min_users: u64, offering: &str) -> Self {
        Self {
            min_users,
            offering: offering.to_string(),
        }
    }
}

/// How one slot is filled within an archetype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SlotPlan {
    /// Ascending by `min_users`, first tier starts at 0
    pub tiers: Vec<CapacityTier>,
    pub reason: String,
}

impl SlotPlan {
    pub fn fixed(offering: &str, reason: &str) -> Self {
        Self::tiered(vec![CapacityTier::new(0, offering)], reason)
    }

    pub fn tiered(tiers: Vec<CapacityTier>, reason: &str) -> Self {
        Self {
            tiers,
            reason: reason.to_string(),
        }
    }

    /// Tier for a user count: the highest tier whose lower bound is reached
    pub fn tier_for(&self, expected_users: u64) -> Option<&CapacityTier> {
        self.tiers
            .iter()
            .take_while(|tier| tier.min_users <= expected_users)
            .last()
    }

    fn validate(&self) -> Result<(), String> {
        match self.tiers.first() {
            None => return Err("has no tiers".to_string()),
            Some(first) if first.min_users != 0 => {
                return Err(format!(
                    "first tier starts at {} users instead of 0",
                    first.min_users
                ));
            }
            Some(_) => {}
        }

        if let Some(pair) = self
            .tiers
            .windows(2)
            .find(|pair| pair[0].min_users >= pair[1].min_users)
        {
            return Err(format!(
                "tiers are not strictly ascending ({} then {})",
                pair[0].min_users, pair[1].min_users
            ));
        }

        Ok(())
    }
}

/// Predefined bundle for a workload type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub project_type: ProjectType,
    pub name: String,
    /// Architecture rationale shown with every recommendation
    pub architecture: String,
    pub slots: BTreeMap<CapabilitySlot, SlotPlan>,
}

/// Display data for an offering id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OfferingProfile {
    pub slot: CapabilitySlot,
    /// Service family, e.g. "EC2". Budget downgrades stay within a family.
    pub service_name: String,
    /// Provider-facing type, e.g. "db.t3.micro"
    pub instance_type: String,
    pub description: String,
}

impl OfferingProfile {
    fn new(slot: CapabilitySlot, service_name: &str, instance_type: &str, description: &str) -> Self {
        Self {
            slot,
            service_name: service_name.to_string(),
            instance_type: instance_type.to_string(),
            description: description.to_string(),
        }
    }
}

/// Closed set of archetypes and offering profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub archetypes: Vec<Archetype>,
    pub offerings: BTreeMap<String, OfferingProfile>,
}

impl Catalog {
    /// Built-in AWS catalog for small teams and indie projects
    pub fn aws_default() -> Self {
        use CapabilitySlot::*;

        let web_service = Archetype {
            project_type: ProjectType::WebService,
            name: "Web service".to_string(),
            architecture: "Single EC2 web tier behind CloudFront, managed MySQL on RDS, \
                           static assets on S3, CloudWatch for metrics and alarms"
                .to_string(),
            slots: BTreeMap::from([
                (
                    Compute,
                    SlotPlan::tiered(
                        vec![
                            CapacityTier::new(0, "t3.micro"),
                            CapacityTier::new(1_000, "t3.small"),
                        ],
                        "Web server sized to the expected audience",
                    ),
                ),
                (Database, SlotPlan::fixed("rds-micro", "Relational data with managed backups")),
                (Storage, SlotPlan::fixed("s3-standard", "Static files and uploads")),
                (Cdn, SlotPlan::fixed("cloudfront", "Caches static content close to users")),
                (Monitoring, SlotPlan::fixed("cloudwatch", "Basic metrics, logs and alarms")),
            ]),
        };

        let game = Archetype {
            project_type: ProjectType::Game,
            name: "Multiplayer game".to_string(),
            architecture: "EC2 game backend with GameLift fleets for sessions, DynamoDB for \
                           player state, S3 + CloudFront for asset delivery, X-Ray tracing"
                .to_string(),
            slots: BTreeMap::from([
                (Compute, SlotPlan::fixed("t3.small", "Game API and matchmaking backend")),
                (
                    Database,
                    SlotPlan::fixed("dynamodb-on-demand", "Low-latency player and session state"),
                ),
                (
                    Storage,
                    SlotPlan::fixed("s3-standard-gamelift", "Game assets plus GameLift hosting"),
                ),
                (Cdn, SlotPlan::fixed("cloudfront", "Patch and asset distribution")),
                (
                    Monitoring,
                    SlotPlan::fixed("cloudwatch-xray", "Metrics plus request tracing"),
                ),
            ]),
        };

        let offerings = [
            ("t3.nano", OfferingProfile::new(Compute, "EC2", "t3.nano", "Burstable virtual server")),
            ("t3.micro", OfferingProfile::new(Compute, "EC2", "t3.micro", "Burstable virtual server")),
            ("t3.small", OfferingProfile::new(Compute, "EC2", "t3.small", "Burstable virtual server")),
            ("t3.medium", OfferingProfile::new(Compute, "EC2", "t3.medium", "Burstable virtual server")),
            ("rds-micro", OfferingProfile::new(Database, "RDS", "db.t3.micro", "Managed MySQL database")),
            ("rds-small", OfferingProfile::new(Database, "RDS", "db.t3.small", "Managed MySQL database")),
            (
                "dynamodb-on-demand",
                OfferingProfile::new(Database, "DynamoDB", "On-Demand", "Serverless NoSQL database"),
            ),
            ("s3-standard", OfferingProfile::new(Storage, "S3", "Standard", "Object storage")),
            (
                "s3-infrequent-access",
                OfferingProfile::new(Storage, "S3", "Standard-IA", "Object storage for cold data"),
            ),
            (
                "s3-standard-gamelift",
                OfferingProfile::new(
                    Storage,
                    "S3 + GameLift",
                    "Standard + c5.large",
                    "Asset storage and dedicated multiplayer hosting",
                ),
            ),
            ("cloudfront", OfferingProfile::new(Cdn, "CloudFront", "Standard", "Content delivery network")),
            ("cloudwatch", OfferingProfile::new(Monitoring, "CloudWatch", "Basic", "Metrics, logs and alarms")),
            (
                "cloudwatch-xray",
                OfferingProfile::new(
                    Monitoring,
                    "CloudWatch + X-Ray",
                    "Basic + tracing",
                    "Metrics, logs and distributed tracing",
                ),
            ),
        ];

        Self {
            archetypes: vec![web_service, game],
            offerings: offerings
                .into_iter()
                .map(|(id, profile)| (id.to_string(), profile))
                .collect(),
        }
    }

    /// Archetype for a project type, or the default archetype
    pub fn archetype(&self, project_type: ProjectType) -> Option<&Archetype> {
        self.archetypes
            .iter()
            .find(|a| a.project_type == project_type)
            .or_else(|| {
                self.archetypes
                    .iter()
                    .find(|a| a.project_type == ProjectType::default())
            })
    }

    pub fn offering(&self, id: &str) -> Option<&OfferingProfile> {
        self.offerings.get(id)
    }

    /// Other offerings in the same slot and service family as `id`
    pub fn family_alternatives<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let profile = self.offering(id);
        self.offerings
            .iter()
            .filter(move |(other, candidate)| {
                other.as_str() != id
                    && profile.is_some_and(|p| {
                        p.slot == candidate.slot && p.service_name == candidate.service_name
                    })
            })
            .map(|(other, _)| other.as_str())
    }

    /// Check structural invariants and that every referenced offering is
    /// described and priced.
    pub fn validate(&self, prices: &dyn PriceSource) -> AdvisorResult<()> {
        let default_type = ProjectType::default();
        if !self.archetypes.iter().any(|a| a.project_type == default_type) {
            return Err(AdvisorError::InvalidCatalog(format!(
                "missing default archetype '{default_type}'"
            )));
        }

        let mut problems = Vec::new();

        for (index, archetype) in self.archetypes.iter().enumerate() {
            if self.archetypes[..index]
                .iter()
                .any(|a| a.project_type == archetype.project_type)
            {
                problems.push(format!("duplicate archetype '{}'", archetype.project_type));
            }

            for slot in CapabilitySlot::iter() {
                let Some(plan) = archetype.slots.get(&slot) else {
                    problems.push(format!("{}: slot '{slot}' is empty", archetype.project_type));
                    continue;
                };

                if let Err(problem) = plan.validate() {
                    problems.push(format!("{}/{slot}: {problem}", archetype.project_type));
                }

                for tier in &plan.tiers {
                    match self.offering(&tier.offering) {
                        None => problems.push(format!(
                            "{}/{slot}: offering '{}' has no profile",
                            archetype.project_type, tier.offering
                        )),
                        Some(profile) if profile.slot != slot => problems.push(format!(
                            "{}/{slot}: offering '{}' belongs to slot '{}'",
                            archetype.project_type, tier.offering, profile.slot
                        )),
                        Some(_) => {}
                    }

                    if prices.unit_price(&tier.offering).is_none() {
                        problems.push(format!(
                            "{}/{slot}: offering '{}' is not priced",
                            archetype.project_type, tier.offering
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::InvalidCatalog(problems.join("; ")))
        }
    }
}

/// Offering profile joined with its unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedOffering {
    pub id: String,
    #[serde(flatten)]
    pub profile: OfferingProfile,
    /// Monthly price at baseline usage; `None` if unpriced
    pub unit_price: Option<f64>,
}

/// Read-only view of the loaded catalog and prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub currency: Currency,
    pub archetypes: Vec<Archetype>,
    pub offerings: Vec<PricedOffering>,
}

impl CatalogView {
    pub fn new(catalog: &Catalog, prices: &dyn PriceSource) -> Self {
        Self {
            currency: prices.currency(),
            archetypes: catalog.archetypes.clone(),
            offerings: catalog
                .offerings
                .iter()
                .map(|(id, profile)| PricedOffering {
                    id: id.clone(),
                    profile: profile.clone(),
                    unit_price: prices.unit_price(id),
                })
                .collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::aws_default()
    }
}
