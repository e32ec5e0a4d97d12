//! Offering price lookup.
//!
//! Prices are monthly amounts at baseline usage (100% intensity). The
//! estimator scales them; nothing in this module knows about usage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::{AdvisorError, AdvisorResult};
use crate::models::Currency;

/// Unit price charged for an offering the table does not know
pub const DEFAULT_FALLBACK_UNIT_PRICE: f64 = 10.0;

/// Source of offering prices
#[cfg_attr(test, mockall::automock)]
pub trait PriceSource: Send + Sync {
    /// Monthly unit price of an offering, `None` if unpriced
    fn unit_price(&self, offering: &str) -> Option<f64>;

    fn currency(&self) -> Currency;
}

/// What to do when an offering has no price
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MissingPricePolicy {
    /// Use the fallback unit price and attach a warning to the result
    #[default]
    Fallback,
    /// Fail the estimate
    Strict,
}

/// Static offering → monthly unit price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    #[serde(default)]
    currency: Currency,
    prices: BTreeMap<String, f64>,
}

impl PricingTable {
    /// Build a table, rejecting negative or non-finite prices
    pub fn new(
        currency: Currency,
        prices: impl IntoIterator<Item = (String, f64)>,
    ) -> AdvisorResult<Self> {
        let table = Self {
            currency,
            prices: prices.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Reject negative or non-finite prices. Tables loaded through serde
    /// skip [`PricingTable::new`], so consumers call this on load.
    pub fn validate(&self) -> AdvisorResult<()> {
        match self
            .prices
            .iter()
            .find(|(_, price)| !price.is_finite() || **price < 0.0)
        {
            Some((offering, price)) => Err(AdvisorError::InvalidCatalog(format!(
                "offering '{offering}' has invalid price {price}"
            ))),
            None => Ok(()),
        }
    }

    /// On-demand AWS prices (USD/month) for the built-in catalog
    pub fn aws_default() -> Self {
        let prices = [
            // EC2
            ("t3.nano", 4.2),
            ("t3.micro", 8.5),
            ("t3.small", 17.0),
            ("t3.medium", 38.0),
            // Databases
            ("rds-micro", 15.0),
            ("rds-small", 30.0),
            ("dynamodb-on-demand", 12.0),
            // Storage (per GB at baseline usage)
            ("s3-standard", 0.023),
            ("s3-infrequent-access", 0.0125),
            ("s3-standard-gamelift", 50.023),
            // Edge
            ("cloudfront", 0.085),
            // Monitoring
            ("cloudwatch", 3.0),
            ("cloudwatch-xray", 8.0),
        ];

        Self {
            currency: Currency::Usd,
            prices: prices
                .into_iter()
                .map(|(offering, price)| (offering.to_string(), price))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for PricingTable {
    fn unit_price(&self, offering: &str) -> Option<f64> {
        self.prices.get(offering).copied()
    }

    fn currency(&self) -> Currency {
        self.currency
    }
}
