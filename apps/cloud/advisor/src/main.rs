//! Cloud Advisor
//!
//! Recommends a cloud service bundle for a project and estimates its monthly
//! cost. Runs one-shot from the command line or as an HTTP API.

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::FromEnv;
use domain_advisor::{AdvisorService, EstimateCostRequest, RecommendRequest};
use eyre::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

mod config;
mod server;

use config::Config;

#[derive(Parser)]
#[command(name = "cloud-advisor")]
#[command(about = "Recommend cloud service bundles and estimate their monthly cost")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a priced service bundle
    Recommend(RecommendArgs),

    /// Estimate the monthly cost of explicit offerings
    Estimate {
        /// Slot and offering, e.g. compute=t3.micro. Repeatable.
        #[arg(short, long = "service", value_parser = parse_service, required = true)]
        services: Vec<(String, String)>,

        /// Usage intensity in percent (100 = baseline)
        #[arg(short, long, default_value_t = 100.0)]
        usage: f64,

        /// Monthly budget, to report utilization
        #[arg(short, long)]
        budget: Option<f64>,
    },

    /// Print the loaded catalog and prices
    Catalog,

    /// Run the HTTP API
    Serve,
}

#[derive(Args)]
struct RecommendArgs {
    /// Project type tag (webService, game)
    #[arg(short, long, conflicts_with = "description")]
    project_type: Option<String>,

    /// Free-form project description, classified by keyword
    #[arg(short, long)]
    description: Option<String>,

    /// Expected number of users
    #[arg(short = 'n', long, default_value_t = 100)]
    users: u64,

    /// Monthly budget
    #[arg(short, long)]
    budget: f64,

    /// Usage intensity in percent (100 = baseline)
    #[arg(short, long, default_value_t = 100.0)]
    usage: f64,

    /// Downgrade within service families until the budget fits
    #[arg(long)]
    optimize: bool,

    /// Include a Terraform scaffold
    #[arg(long)]
    terraform: bool,

    /// Region for the Terraform provider
    #[arg(short, long)]
    region: Option<String>,
}

impl From<RecommendArgs> for RecommendRequest {
    fn from(args: RecommendArgs) -> Self {
        RecommendRequest {
            project_type: args.project_type,
            description: args.description,
            expected_users: args.users,
            budget: Some(args.budget),
            usage_intensity: args.usage,
            optimize_for_budget: args.optimize,
            include_terraform: args.terraform,
            region: args.region,
        }
    }
}

fn parse_service(raw: &str) -> std::result::Result<(String, String), String> {
    let (slot, offering) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected slot=offering, got '{raw}'"))?;
    let (slot, offering) = (slot.trim(), offering.trim());
    if slot.is_empty() || offering.is_empty() {
        return Err(format!("expected slot=offering, got '{raw}'"));
    }
    Ok((slot.to_string(), offering.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let (catalog, pricing) = config.load_catalog()?;
    let service = AdvisorService::new(catalog, pricing, config.engine.clone())?;

    match cli.command {
        Commands::Recommend(args) => {
            let recommendation = service.recommend(args.into())?;
            print_json(&recommendation)?;
        }

        Commands::Estimate {
            services,
            usage,
            budget,
        } => {
            let estimate = service.estimate_cost(EstimateCostRequest {
                services: services.into_iter().collect::<BTreeMap<_, _>>(),
                usage_intensity: usage,
                budget,
            })?;
            print_json(&estimate)?;
        }

        Commands::Catalog => print_json(&service.catalog_view())?,

        Commands::Serve => {
            observability::init_metrics()?;
            info!(environment = %config.environment, "Starting HTTP API");
            server::serve(server::router(service), &config.server).await?;
        }
    }

    Ok(())
}
