//! Encryption key generation.

use clap::Args;

use storefront_auth::session::generate_key;
use storefront_core::config::AuthConfig;
use storefront_core::error::AppError;

/// Arguments for key generation
#[derive(Debug, Args)]
pub struct GenKeyArgs {
    /// Print as an environment override line
    #[arg(long)]
    pub env: bool,
}

/// Print a fresh 32-character key usable as `auth.encryption_key`.
pub fn execute(args: &GenKeyArgs) -> Result<(), AppError> {
    let key = generate_key(32);
    AuthConfig {
        encryption_key: key.clone(),
        ..AuthConfig::default()
    }
    .key_bytes()?;

    if args.env {
        println!("STOREFRONT__AUTH__ENCRYPTION_KEY={key}");
    } else {
        println!("{key}");
    }
    Ok(())
}
