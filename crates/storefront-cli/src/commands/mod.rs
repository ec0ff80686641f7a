//! CLI command definitions and dispatch.

pub mod account;
pub mod config;
pub mod key;
pub mod store;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use storefront_core::config::AppConfig;
use storefront_core::error::AppError;
use storefront_core::traits::DocumentStore;

use crate::output::OutputFormat;

/// Storefront: customer and admin sessions with live product updates
#[derive(Debug, Parser)]
#[command(name = "storefront", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Admin account management
    Admin(account::AdminArgs),
    /// Customer account management
    Customer(account::CustomerArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
    /// Generate a token encryption key
    GenKey(key::GenKeyArgs),
    /// Document store maintenance
    Store(store::StoreArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Admin(args) => account::execute_admin(args, &self.config, self.format).await,
            Commands::Customer(args) => {
                account::execute_customer(args, &self.config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &self.config, self.format),
            Commands::GenKey(args) => key::execute(args),
            Commands::Store(args) => store::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: open the configured document store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    storefront_database::open_store(&config.database).await
}
