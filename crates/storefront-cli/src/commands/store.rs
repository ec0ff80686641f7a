//! Document store maintenance commands.

use clap::{Args, Subcommand};

use storefront_core::error::AppError;
use storefront_database::repositories::ConnectionRepository;

use crate::output;

/// Arguments for store commands
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Store subcommand
    #[command(subcommand)]
    pub command: StoreCommand,
}

/// Store subcommands
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Check that the document store answers
    Check,
    /// Remove expired documents and stale connection records
    Purge,
}

/// Execute store commands
pub async fn execute(args: &StoreArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    match &args.command {
        StoreCommand::Check => {
            if store.health_check().await? {
                output::print_success("Document store is reachable");
            } else {
                return Err(AppError::database("Document store did not answer"));
            }
        }
        StoreCommand::Purge => {
            let expired = store.purge_expired().await?;
            let stale = ConnectionRepository::new(store).clear().await?;
            output::print_success(&format!(
                "Removed {expired} expired documents and {stale} connection records"
            ));
        }
    }
    Ok(())
}
