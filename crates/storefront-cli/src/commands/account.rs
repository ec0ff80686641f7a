//! Admin and customer account commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use storefront_api::AppState;
use storefront_core::config::StoreBackend;
use storefront_core::error::AppError;
use storefront_database::repositories::AccountRepository;
use storefront_entity::account::{
    Account, AccountProfile, AccountRole, AdminAccess, AdminProfile, CustomerProfile,
};

use crate::output::{self, OutputFormat};

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create an admin account
    Create {
        /// Admin name (will prompt if not provided)
        #[arg(short, long)]
        name: Option<String>,
        /// Access level: full or editor
        #[arg(short, long, default_value = "full")]
        access: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List admin accounts
    List,
    /// Revoke every session of an admin
    Logout {
        /// Admin name
        name: String,
    },
}

/// Arguments for customer commands
#[derive(Debug, Args)]
pub struct CustomerArgs {
    /// Customer subcommand
    #[command(subcommand)]
    pub command: CustomerCommand,
}

/// Customer subcommands
#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// Create a confirmed customer account
    Create {
        /// Email (will prompt if not provided)
        #[arg(short, long)]
        email: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
        /// Given name
        #[arg(long, default_value = "")]
        first_name: String,
        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// List customer accounts
    List,
    /// Revoke every session of a customer
    Logout {
        /// Customer email
        email: String,
    },
}

/// One account row in list output.
#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    #[tabled(rename = "Identity")]
    identity: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Sessions")]
    sessions: usize,
    #[tabled(rename = "Created")]
    created_at: DateTime<Utc>,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            identity: account.identity.clone(),
            role: account.role.to_string(),
            access: account
                .profile
                .admin_access()
                .map(|a| a.to_string())
                .unwrap_or_default(),
            sessions: account.session_tokens.len(),
            created_at: account.created_at,
        }
    }
}

/// Execute admin commands
pub async fn execute_admin(
    args: &AdminArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = build_state(config_path).await?;

    match &args.command {
        AdminCommand::Create {
            name,
            access,
            password,
        } => {
            let access: AdminAccess = access.parse()?;
            let name = prompt_text(name.as_deref(), "Admin name")?;
            let password = prompt_password(password.as_deref())?;

            let account = state
                .accounts
                .create_account(
                    &name,
                    &password,
                    AccountProfile::Admin(AdminProfile { access }),
                )
                .await?;
            output::print_success(&format!("Admin '{}' created ({access})", account.identity));
        }
        AdminCommand::List => list(&state, AccountRole::Admin, format).await?,
        AdminCommand::Logout { name } => logout(&state, AccountRole::Admin, name).await?,
    }
    Ok(())
}

/// Execute customer commands
pub async fn execute_customer(
    args: &CustomerArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = build_state(config_path).await?;

    match &args.command {
        CustomerCommand::Create {
            email,
            password,
            first_name,
            last_name,
        } => {
            let email = prompt_text(email.as_deref(), "Customer email")?;
            let password = prompt_password(password.as_deref())?;
            let profile = CustomerProfile {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                ..CustomerProfile::default()
            };

            let account = state
                .accounts
                .create_account(&email, &password, AccountProfile::Customer(profile))
                .await?;
            output::print_success(&format!("Customer '{}' created", account.identity));
        }
        CustomerCommand::List => list(&state, AccountRole::Customer, format).await?,
        CustomerCommand::Logout { email } => logout(&state, AccountRole::Customer, email).await?,
    }
    Ok(())
}

async fn build_state(config_path: &str) -> Result<AppState, AppError> {
    let config = super::load_config(config_path)?;
    if config.database.backend == StoreBackend::Memory {
        output::print_warning("The memory backend does not persist; changes vanish on exit");
    }
    let store = super::open_store(&config).await?;
    AppState::build(config, store)
}

async fn list(state: &AppState, role: AccountRole, format: OutputFormat) -> Result<(), AppError> {
    let accounts = AccountRepository::new(state.store.clone()).list(role).await?;
    let rows: Vec<AccountRow> = accounts.iter().map(AccountRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

async fn logout(state: &AppState, role: AccountRole, identity: &str) -> Result<(), AppError> {
    if state.sessions.logout(role, identity).await? {
        output::print_success(&format!("All sessions of {role} '{identity}' revoked"));
    } else {
        output::print_warning(&format!("No {role} named '{identity}'"));
    }
    Ok(())
}

fn prompt_text(value: Option<&str>, prompt: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v.to_string()),
        None => dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}

fn prompt_password(value: Option<&str>) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v.to_string()),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}
