//! Configuration inspection commands.

use clap::{Args, Subcommand};

use storefront_core::error::AppError;
use storefront_database::connection::mask_password;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.auth.encryption_key = "********".to_string();
            config.auth.shared_secret = "********".to_string();
            config.realtime.update_key = "********".to_string();
            config.database.url = mask_password(&config.database.url);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                println!("  Server: {}:{}", config.server.host, config.server.port);
                println!("  Store: {:?}", config.database.backend);
                if !config.database.url.is_empty() {
                    println!("  Database: {}", mask_password(&config.database.url));
                }
                if config.auth.uses_development_key() {
                    output::print_warning("auth.encryption_key is the development placeholder");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }
    Ok(())
}
