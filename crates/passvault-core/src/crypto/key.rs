//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module derives per-user encryption keys from a passphrase and the
//! salt stored in the user's encryption profile. The iteration count makes
//! every guess expensive for an offline attacker.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// Default PBKDF2 iteration count (OWASP minimum for PBKDF2-HMAC-SHA256 at
/// the time profiles were first issued).
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count a profile may use.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Length of a profile salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Length of derived key in bytes.
const KEY_LENGTH: usize = 32;

/// Bytes of the derived key used as the HMAC signing key.
const SIGNING_KEY_LENGTH: usize = 16;

/// A cryptographic key derived from a passphrase.
///
/// The first half signs tokens, the second half encrypts them. Key material
/// is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a new DerivedKey from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.key[..SIGNING_KEY_LENGTH]
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.key[SIGNING_KEY_LENGTH..]
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// PBKDF2 key derivation with a fixed iteration count.
///
/// The iteration count is part of a user's encryption profile: changing it
/// for an existing profile would make every stored token undecryptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivation {
    iterations: u32,
}

impl Default for KeyDerivation {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KeyDerivation {
    /// Create a derivation with a custom iteration count.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if `iterations` is below
    /// [`MIN_ITERATIONS`].
    pub fn with_iterations(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(VaultError::InvalidInput(format!(
                "KDF iterations must be at least {} (got {})",
                MIN_ITERATIONS, iterations
            )));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive a 32-byte key from a passphrase and a profile salt.
    ///
    /// The work done depends only on the iteration count, never on the
    /// passphrase. There is no way to detect a wrong passphrase here; that
    /// only surfaces when a token fails to verify.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if the passphrase is empty or the
    /// salt is not exactly [`SALT_LENGTH`] bytes.
    pub fn derive(&self, passphrase: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        if passphrase.is_empty() {
            return Err(VaultError::InvalidInput(
                "Passphrase cannot be empty".to_string(),
            ));
        }

        if salt.len() != SALT_LENGTH {
            return Err(VaultError::InvalidInput(format!(
                "Salt must be exactly {} bytes (got {})",
                SALT_LENGTH,
                salt.len()
            )));
        }

        let mut key_bytes = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(passphrase, salt, self.iterations, &mut key_bytes);

        Ok(DerivedKey::from_bytes(key_bytes))
    }
}

/// Derive an encryption key with the default iteration count.
///
/// # Examples
///
/// ```
/// use passvault_core::crypto::derive_key;
///
/// let salt = [7u8; 32];
/// let key = derive_key(b"my-passphrase", &salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<DerivedKey> {
    KeyDerivation::default().derive(passphrase, salt)
}

/// Generate a fresh profile salt from the OS CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH]> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| VaultError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}
