//! Application context for the passvault CLI.
//!
//! Combines CLI arguments with the config file, resolves the database and
//! user, and opens the vault.

use std::cell::OnceCell;
use std::io::IsTerminal;
use std::path::PathBuf;

use passvault_core::crypto::KeyDerivation;
use passvault_core::{Record, SqliteStore, UserId, UserKey, Vault};

use crate::cli::Cli;
use crate::config::{default_config_path, default_database_path, read_config, PassvaultConfig};
use crate::errors::{from_vault, CliError};
use crate::helpers::prompt_passphrase;

/// Application context that bundles CLI args with the loaded config.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<PassvaultConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Config file path: `--config`, `PASSVAULT_CONFIG`, then the XDG default.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match self.cli.config.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => default_config_path(),
        }
    }

    /// The config file, or `None` when it does not exist yet.
    pub fn config(&self) -> anyhow::Result<Option<&PassvaultConfig>> {
        if let Some(config) = self.config.get() {
            return Ok(config.as_ref());
        }
        let path = self.config_path()?;
        let loaded = if path.exists() {
            Some(read_config(&path)?)
        } else {
            None
        };
        Ok(self.config.get_or_init(|| loaded).as_ref())
    }

    /// Database path: `--db`, `PASSVAULT_DB`, the config, then the XDG default.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.db.as_deref().filter(|p| !p.trim().is_empty()) {
            return Ok(PathBuf::from(path));
        }
        match self.config()? {
            Some(config) => Ok(PathBuf::from(&config.vault.database)),
            None => default_database_path(),
        }
    }

    /// The acting user: `--user`, `PASSVAULT_USER`, then the config.
    pub fn user_id(&self) -> anyhow::Result<UserId> {
        let from_config = self.config()?.and_then(|c| c.vault.user.clone());
        let user = self
            .cli
            .user
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or(from_config)
            .ok_or_else(|| {
                CliError::not_found(
                    "No user configured",
                    "Hint: Pass --user, set PASSVAULT_USER, or run `passvault init --user <name>`.",
                )
            })?;
        UserId::new(user).map_err(from_vault)
    }

    pub fn import_category(&self) -> anyhow::Result<Option<String>> {
        Ok(self.config()?.map(|c| c.import.category.clone()))
    }

    pub fn import_file(&self) -> anyhow::Result<Option<String>> {
        Ok(self.config()?.map(|c| c.import.default_file.clone()))
    }

    fn key_derivation(&self) -> anyhow::Result<KeyDerivation> {
        match self.config()? {
            Some(config) => {
                KeyDerivation::with_iterations(config.security.kdf_iterations).map_err(from_vault)
            }
            None => Ok(KeyDerivation::default()),
        }
    }

    /// Open the vault database, creating it on first use.
    pub fn open_vault(&self) -> anyhow::Result<Vault<SqliteStore>> {
        let path = self.database_path()?;
        let store = SqliteStore::open(&path).map_err(|e| {
            anyhow::anyhow!("Failed to open vault {}: {}", path.display(), e)
        })?;
        let mut vault = Vault::new(store).with_kdf(self.key_derivation()?);
        if let Some(category) = self.import_category()? {
            vault = vault.with_import_category(category);
        }
        Ok(vault)
    }

    /// Prompt for the passphrase and derive the user's key.
    pub fn unlock(&self, vault: &Vault<SqliteStore>) -> anyhow::Result<UserKey> {
        let user_id = self.user_id()?;
        let passphrase = prompt_passphrase(std::io::stdin().is_terminal())?;
        vault.unlock(&user_id, &passphrase).map_err(from_vault)
    }
}

/// Find a record by UUID or, failing that, by service name.
///
/// A service name that matches more than one record is rejected so the
/// caller can disambiguate by ID.
pub fn resolve_record(
    vault: &Vault<SqliteStore>,
    user_id: &UserId,
    reference: &str,
) -> anyhow::Result<Record> {
    if let Ok(id) = uuid::Uuid::parse_str(reference) {
        return vault.get_record(user_id, &id).map_err(from_vault);
    }

    let mut matches = vault
        .find_records(user_id, reference)
        .map_err(from_vault)?;
    match matches.len() {
        0 => Err(CliError::not_found(
            format!("No record for service \"{}\"", reference),
            "Hint: Run `passvault list` to see your records.",
        )
        .into()),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::invalid_input(format!(
            "{} records match \"{}\"; use the record ID instead",
            n, reference
        ))
        .into()),
    }
}
