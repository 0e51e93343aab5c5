//! Input helper functions for the CLI.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Password;
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::constants::env_vars;
use crate::errors::CliError;

/// Prompt for passphrase, or read from PASSVAULT_PASSPHRASE env var.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    if let Ok(value) = std::env::var(env_vars::PASSPHRASE) {
        if !value.trim().is_empty() {
            return Ok(SecretString::from(value));
        }
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ))
        .into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Read a record secret from stdin (first line) or an interactive prompt.
///
/// An empty secret is allowed and means "no secret".
pub fn read_secret(from_stdin: bool) -> anyhow::Result<SecretString> {
    if from_stdin || !io::stdin().is_terminal() {
        let mut buffer = Zeroizing::new(String::new());
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(SecretString::from(first_line(&buffer).to_string()));
    }

    Password::new()
        .with_prompt("Secret")
        .with_confirmation("Confirm secret", "Secrets do not match")
        .allow_empty_password(true)
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))
}

fn first_line(input: &str) -> &str {
    input.lines().next().unwrap_or("").trim_end_matches('\r')
}

/// Read an import file. The plaintext is wiped when the buffer drops.
pub fn read_import_file(path: &Path) -> anyhow::Result<Zeroizing<String>> {
    if !path.exists() {
        return Err(CliError::not_found(
            format!("Import file not found: {}", path.display()),
            "Hint: Pass --file or set [import] default_file in the config.",
        )
        .into());
    }
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}
