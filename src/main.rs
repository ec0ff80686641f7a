//! Storefront server: customer and admin sessions with live product updates.
//!
//! Main entry point that loads configuration, opens the document store and
//! hands both to the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use storefront_core::config::AppConfig;
use storefront_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `STOREFRONT_ENV` overlay and env overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("STOREFRONT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Storefront v{}", env!("CARGO_PKG_VERSION"));

    let store = storefront_database::open_store(&config.database).await?;
    storefront_api::app::run_server(config, store).await
}
