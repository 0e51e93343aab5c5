//! # Passvault Core
//!
//! Core library for passvault - a personal password vault whose secrets can
//! only be read back with the owner's passphrase.
//!
//! This crate provides key derivation, authenticated encryption, the
//! flat-text importer and the storage abstractions, independent of any
//! CLI or web interface. Identity is out of scope: callers hand in a
//! verified [`UserId`] and, transiently, the user's passphrase.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation and the secret token cipher
//! - **profile**: per-user salt, created lazily and never changed
//! - **import**: flat-text dump parser
//! - **storage**: storage traits and the SQLite backend
//! - **vault**: the operations callers use, composed from the above

pub mod crypto;
pub mod error;
pub mod import;
pub mod profile;
pub mod storage;
pub mod vault;

pub use crypto::SecretToken;
pub use error::{Result, VaultError};
pub use import::{ImportSkipped, SkipReason};
pub use storage::{EncryptionProfile, Record, SqliteStore, UserId};
pub use vault::{
    mask_secret, ImportReport, RecordDraft, RecordUpdate, UserKey, Vault, DEFAULT_IMPORT_CATEGORY,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
