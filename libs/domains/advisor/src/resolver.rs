//! Catalog resolver: workload signals → fully populated service bundle

use std::sync::Arc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{AdvisorError, AdvisorResult};
use crate::models::{SelectedOffering, ServiceBundle, WorkloadProfile};

#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog: Arc<Catalog>,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Pick one offering per slot for the workload.
    ///
    /// Project types without an archetype use the default archetype. The
    /// budget does not influence selection. Errors only if the catalog was
    /// never validated.
    pub fn resolve(&self, profile: &WorkloadProfile) -> AdvisorResult<ServiceBundle> {
        let archetype = self.catalog.archetype(profile.project_type).ok_or_else(|| {
            AdvisorError::InvalidCatalog("catalog has no default archetype".to_string())
        })?;

        let mut slots = std::collections::BTreeMap::new();
        for (slot, plan) in &archetype.slots {
            let tier = plan.tier_for(profile.expected_users).ok_or_else(|| {
                AdvisorError::InvalidCatalog(format!(
                    "{}/{slot} has no tier for {} users",
                    archetype.project_type, profile.expected_users
                ))
            })?;

            debug!(
                slot = %slot,
                offering = %tier.offering,
                min_users = tier.min_users,
                "Resolved capacity tier"
            );

            slots.insert(
                *slot,
                SelectedOffering {
                    offering: tier.offering.clone(),
                    reason: plan.reason.clone(),
                },
            );
        }

        Ok(ServiceBundle {
            project_type: archetype.project_type,
            archetype: archetype.name.clone(),
            architecture: archetype.architecture.clone(),
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Archetype, CapacityTier, SlotPlan};
    use crate::models::{CapabilitySlot, ProjectType};
    use strum::IntoEnumIterator;

    fn resolver() -> CatalogResolver {
        CatalogResolver::new(Arc::new(Catalog::aws_default()))
    }

    fn profile(project_type: &str, expected_users: u64) -> WorkloadProfile {
        WorkloadProfile {
            project_type: ProjectType::from_tag(project_type),
            expected_users,
            budget: 100.0,
        }
    }

    #[test]
    fn test_every_slot_populated_for_every_project_type() {
        let resolver = resolver();
        for project_type in ProjectType::iter() {
            for users in [0, 999, 1_000, 1_000_000] {
                let bundle = resolver
                    .resolve(&WorkloadProfile {
                        project_type,
                        expected_users: users,
                        budget: 10.0,
                    })
                    .unwrap();
                for slot in CapabilitySlot::iter() {
                    assert!(
                        bundle.offering(slot).is_some(),
                        "{project_type} @ {users}: {slot} empty"
                    );
                }
            }
        }
    }

    #[test]
    fn test_web_service_small_audience_gets_micro() {
        let bundle = resolver().resolve(&profile("webService", 500)).unwrap();
        assert_eq!(bundle.offering(CapabilitySlot::Compute), Some("t3.micro"));
        assert_eq!(bundle.offering(CapabilitySlot::Database), Some("rds-micro"));
    }

    #[test]
    fn test_compute_threshold_boundary() {
        let resolver = resolver();
        let below = resolver.resolve(&profile("webService", 999)).unwrap();
        let at = resolver.resolve(&profile("webService", 1_000)).unwrap();
        assert_eq!(below.offering(CapabilitySlot::Compute), Some("t3.micro"));
        assert_eq!(at.offering(CapabilitySlot::Compute), Some("t3.small"));
    }

    #[test]
    fn test_game_bundle() {
        let bundle = resolver().resolve(&profile("game", 5_000)).unwrap();
        assert_eq!(bundle.project_type, ProjectType::Game);
        assert_eq!(bundle.offering(CapabilitySlot::Database), Some("dynamodb-on-demand"));
        assert_eq!(bundle.offering(CapabilitySlot::Storage), Some("s3-standard-gamelift"));
        assert_eq!(bundle.offering(CapabilitySlot::Monitoring), Some("cloudwatch-xray"));
    }

    #[test]
    fn test_unknown_project_type_resolves_to_default_bundle() {
        let resolver = resolver();
        let default = resolver.resolve(&profile("webService", 250)).unwrap();
        for tag in ["iot", "blog", "", "ecommerce"] {
            assert_eq!(resolver.resolve(&profile(tag, 250)).unwrap(), default);
        }
    }

    #[test]
    fn test_budget_does_not_change_bundle() {
        let resolver = resolver();
        let mut cheap = profile("game", 10);
        cheap.budget = 1.0;
        let mut rich = profile("game", 10);
        rich.budget = 1_000_000.0;
        assert_eq!(resolver.resolve(&cheap).unwrap(), resolver.resolve(&rich).unwrap());
    }

    #[test]
    fn test_custom_catalog_is_used() {
        let catalog = Catalog {
            archetypes: vec![Archetype {
                project_type: ProjectType::WebService,
                name: "Tiny".to_string(),
                architecture: String::new(),
                slots: CapabilitySlot::iter()
                    .map(|slot| {
                        (
                            slot,
                            SlotPlan::tiered(
                                vec![CapacityTier::new(0, "a"), CapacityTier::new(10, "b")],
                                "test",
                            ),
                        )
                    })
                    .collect(),
            }],
            offerings: Default::default(),
        };
        let resolver = CatalogResolver::new(Arc::new(catalog));

        let bundle = resolver.resolve(&profile("game", 10)).unwrap();
        assert_eq!(bundle.archetype, "Tiny");
        assert!(bundle.slots.values().all(|s| s.offering == "b"));
    }
}
