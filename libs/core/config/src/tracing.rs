use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEVELOPMENT_FILTER: &str = "debug,hyper=info,tower_http=debug";
const PRODUCTION_FILTER: &str = "info,tower_http=warn";

/// Install color-eyre for binaries. Safe to call more than once.
///
/// Shows the error location, hides the environment section.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global subscriber with an [`tracing_error::ErrorLayer`]
/// so eyre reports carry span traces.
///
/// - Production (`APP_ENV=production`): flattened JSON events, no targets
/// - Development: pretty, human-readable output
///
/// `RUST_LOG` overrides the default filter. Calling this again after a
/// subscriber is installed is a no-op.
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if environment.is_production() {
            PRODUCTION_FILTER
        } else {
            DEVELOPMENT_FILTER
        })
    });

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(()) => info!(%environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}
