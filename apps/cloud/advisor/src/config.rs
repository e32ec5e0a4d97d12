//! Configuration for the cloud advisor

use core_config::server::ServerConfig;
use core_config::{ConfigError, Environment, FromEnv, env_optional, env_or_default, env_parse};
use domain_advisor::pricing::DEFAULT_FALLBACK_UNIT_PRICE;
use domain_advisor::terraform::{DEFAULT_REGION, is_valid_region};
use domain_advisor::{Catalog, EngineConfig, MissingPricePolicy, PricingTable};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub engine: EngineConfig,
    /// JSON file with a custom catalog and pricing table
    pub catalog_path: Option<PathBuf>,
}

fn default_region() -> Result<String, ConfigError> {
    let region = env_or_default("ADVISOR_DEFAULT_REGION", DEFAULT_REGION);
    if !is_valid_region(&region) {
        return Err(ConfigError::ParseError {
            key: "ADVISOR_DEFAULT_REGION".to_string(),
            details: format!("'{region}' is not a region name like us-east-1"),
        });
    }
    Ok(region)
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            engine: EngineConfig {
                missing_price_policy: env_parse(
                    "ADVISOR_MISSING_PRICE_POLICY",
                    MissingPricePolicy::default(),
                )?,
                fallback_unit_price: env_parse(
                    "ADVISOR_FALLBACK_UNIT_PRICE",
                    DEFAULT_FALLBACK_UNIT_PRICE,
                )?,
                default_region: default_region()?,
            },
            catalog_path: env_optional("ADVISOR_CATALOG_PATH").map(PathBuf::from),
        })
    }
}

/// On-disk catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    catalog: Catalog,
    pricing: PricingTable,
}

impl Config {
    /// Catalog and prices from `ADVISOR_CATALOG_PATH`, or the built-in ones
    pub fn load_catalog(&self) -> Result<(Catalog, PricingTable)> {
        match &self.catalog_path {
            Some(path) => load_catalog_file(path),
            None => Ok((Catalog::aws_default(), PricingTable::aws_default())),
        }
    }
}

fn load_catalog_file(path: &Path) -> Result<(Catalog, PricingTable)> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read catalog file {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Failed to parse catalog file {}", path.display()))?;
    file.pricing.validate()?;

    info!(
        path = %path.display(),
        archetypes = file.catalog.archetypes.len(),
        prices = file.pricing.len(),
        "Loaded catalog file"
    );
    Ok((file.catalog, file.pricing))
}
