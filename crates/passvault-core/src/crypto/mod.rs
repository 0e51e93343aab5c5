//! Cryptographic operations for passvault.
//!
//! This module provides key derivation and authenticated encryption using
//! RustCrypto primitives:
//! - **PBKDF2-HMAC-SHA256**: iterated key derivation from the user passphrase
//! - **AES-128-CBC + HMAC-SHA256**: encrypt-then-MAC secret tokens
//!
//! ## Security Model
//!
//! - One random salt per user, stored in the encryption profile
//! - Derived keys are never persisted and are zeroized on drop
//! - Tokens are verified before any ciphertext is decrypted
//! - A wrong passphrase yields [`VaultError::AuthFailure`], never garbage
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the record database
//! - Offline brute-force attacks on the passphrase
//! - Tampering with stored tokens
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked process / memory
//!
//! [`VaultError::AuthFailure`]: crate::error::VaultError::AuthFailure

pub mod cipher;
pub mod key;
pub mod token;

pub use cipher::{decrypt, encrypt, issued_at};
pub use key::{
    derive_key, generate_salt, DerivedKey, KeyDerivation, DEFAULT_ITERATIONS, MIN_ITERATIONS,
    SALT_LENGTH,
};
pub use token::{SecretToken, TOKEN_VERSION};
