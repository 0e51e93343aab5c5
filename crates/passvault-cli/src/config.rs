use std::path::{Path, PathBuf};

use passvault_core::crypto::DEFAULT_ITERATIONS;
use passvault_core::DEFAULT_IMPORT_CATEGORY;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_IMPORT_FILE;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PassvaultConfig {
    pub vault: VaultSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub import: ImportSection,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VaultSection {
    pub database: String,
    pub user: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SecuritySection {
    /// Iterations for profiles created from now on.
    pub kdf_iterations: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ImportSection {
    pub category: String,
    pub default_file: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            category: DEFAULT_IMPORT_CATEGORY.to_string(),
            default_file: DEFAULT_IMPORT_FILE.to_string(),
        }
    }
}

impl PassvaultConfig {
    pub fn new(database: PathBuf, user: Option<String>, kdf_iterations: u32) -> Self {
        Self {
            vault: VaultSection {
                database: database.to_string_lossy().to_string(),
                user,
            },
            security: SecuritySection { kdf_iterations },
            import: ImportSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("passvault.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<PassvaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &PassvaultConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("passvault"));
        }
    }
    Ok(home_dir()?.join(".config").join("passvault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("passvault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("passvault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
