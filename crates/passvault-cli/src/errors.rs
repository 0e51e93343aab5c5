//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use passvault_core::VaultError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, user, record)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase or tampered secret)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Stored data could not be parsed
    CorruptedData(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::CorruptedData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::CorruptedData(_) => exit_codes::CORRUPTED_DATA,
        }
    }
}

/// Map core errors with a dedicated exit code; everything else stays a
/// general failure.
pub fn from_vault(err: VaultError) -> anyhow::Error {
    if err.is_auth_failure() {
        return CliError::auth_failed_with_hint(
            err.to_string(),
            format!(
                "Hint: Check your passphrase or set {}.",
                crate::constants::env_vars::PASSPHRASE
            ),
        )
        .into();
    }
    match err {
        VaultError::InvalidInput(message) => CliError::invalid_input(message).into(),
        VaultError::MalformedToken(message) => CliError::CorruptedData(format!(
            "Stored secret is corrupted: {}",
            message
        ))
        .into(),
        VaultError::RecordNotFound(id) => CliError::not_found(
            format!("Record not found: {}", id),
            "Hint: Run `passvault list` to see your records.",
        )
        .into(),
        other => other.into(),
    }
}

/// Exit code for any error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(1)
}
