use std::path::PathBuf;

use passvault_core::crypto::{KeyDerivation, DEFAULT_ITERATIONS};
use passvault_core::{SqliteStore, UserId, Vault};
use tracing::debug;

use crate::app::AppContext;
use crate::cli::InitArgs;
use crate::config::{default_database_path, write_config, PassvaultConfig};
use crate::errors::{from_vault, CliError};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = ctx.config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    let iterations = args.kdf_iterations.unwrap_or(DEFAULT_ITERATIONS);
    let kdf = KeyDerivation::with_iterations(iterations).map_err(from_vault)?;

    let database = match ctx.cli().db.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => PathBuf::from(path),
        None => default_database_path()?,
    };
    let user = match ctx.cli().user.as_deref() {
        Some(name) => Some(UserId::new(name).map_err(from_vault)?),
        None => None,
    };

    let store = SqliteStore::open(&database)
        .map_err(|e| anyhow::anyhow!("Failed to create vault {}: {}", database.display(), e))?;
    if let Some(user_id) = user.as_ref() {
        let profile = Vault::new(store)
            .with_kdf(kdf)
            .get_or_create_profile(user_id)
            .map_err(from_vault)?;
        debug!(user = %profile.user_id, "profile ready");
    }

    let config = PassvaultConfig::new(
        database.clone(),
        user.map(|u| u.as_str().to_string()),
        kdf.iterations(),
    );
    write_config(&config_path, &config)?;

    if !ctx.quiet() {
        println!("Initialized passvault at {}", database.display());
        println!("Config written to {}", config_path.display());
    }
    Ok(())
}
