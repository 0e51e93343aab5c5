//! Error types for passvault core operations.
//!
//! The first three variants are the outcomes callers must be able to tell
//! apart: a bad request, corrupted stored data, and a passphrase that does
//! not unlock a secret. The CLI layer maps these to user-facing messages.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for passvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for passvault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller bug: empty passphrase, malformed salt, bad identifier.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored token is structurally invalid.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The passphrase does not unlock this secret.
    ///
    /// Wrong key, corruption and tampering all end up here on purpose.
    #[error("Incorrect passphrase or corrupted secret")]
    AuthFailure,

    /// Cipher or RNG setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Record not found by ID
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VaultError {
    /// True when the caller should ask the user to re-enter the passphrase.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, VaultError::AuthFailure)
    }
}
