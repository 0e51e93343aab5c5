//! Secret token layout.
//!
//! ```text
//! version:u8 | timestamp:u64 (BE seconds) | IV:16 | ciphertext:16*n | MAC:32
//! ```
//!
//! The layout is persisted and must stay stable. Stored tokens are URL-safe
//! base64 with padding.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{Result, VaultError};

/// Current token version byte.
pub const TOKEN_VERSION: u8 = 0x80;

pub(crate) const TIMESTAMP_LENGTH: usize = 8;
pub(crate) const IV_LENGTH: usize = 16;
pub(crate) const BLOCK_LENGTH: usize = 16;
pub(crate) const MAC_LENGTH: usize = 32;

const HEADER_LENGTH: usize = 1 + TIMESTAMP_LENGTH + IV_LENGTH;
const MIN_TOKEN_LENGTH: usize = HEADER_LENGTH + BLOCK_LENGTH + MAC_LENGTH;

/// An authenticated ciphertext, opaque to everything but the cipher.
///
/// Held in its stored text form. The text is only decoded when the token is
/// opened, so a corrupted column fails that one secret and nothing else.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken {
    encoded: String,
}

impl SecretToken {
    pub(crate) fn from_raw(bytes: &[u8]) -> Self {
        Self {
            encoded: URL_SAFE.encode(bytes),
        }
    }

    /// Wrap raw token bytes read from somewhere other than a text column.
    ///
    /// Structure is checked on decrypt, not here.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::from_raw(bytes.as_ref())
    }

    /// Wrap stored text without checking it.
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    /// Decode a token from its stored text form, rejecting invalid base64
    /// up front.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedToken` if the text is not valid base64.
    pub fn decode(encoded: &str) -> Result<Self> {
        let token = Self::from_stored(encoded.trim());
        token.to_bytes()?;
        Ok(token)
    }

    /// The text form stored in a column.
    pub fn encode(&self) -> String {
        self.encoded.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Raw token bytes.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedToken` if the text is not valid base64.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        URL_SAFE
            .decode(self.encoded.trim())
            .map_err(|e| VaultError::MalformedToken(format!("Invalid base64: {}", e)))
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretToken")
            .field("len", &self.encoded.len())
            .finish()
    }
}

/// Borrowed view over the fields of a structurally valid token.
///
/// Nothing in here has been authenticated yet.
#[derive(Debug)]
pub(crate) struct TokenParts<'a> {
    pub version: u8,
    pub timestamp: u64,
    pub iv: &'a [u8],
    pub ciphertext: &'a [u8],
    /// Every byte the MAC covers: version through ciphertext.
    pub signed: &'a [u8],
    pub mac: &'a [u8],
}

impl<'a> TokenParts<'a> {
    /// Split raw token bytes into fields, checking lengths only.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < MIN_TOKEN_LENGTH {
            return Err(VaultError::MalformedToken(format!(
                "Token too short: {} bytes (minimum {})",
                bytes.len(),
                MIN_TOKEN_LENGTH
            )));
        }

        let (signed, mac) = bytes.split_at(bytes.len() - MAC_LENGTH);
        let ciphertext = &signed[HEADER_LENGTH..];
        if ciphertext.len() % BLOCK_LENGTH != 0 {
            return Err(VaultError::MalformedToken(format!(
                "Ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                BLOCK_LENGTH
            )));
        }

        let mut timestamp_bytes = [0u8; TIMESTAMP_LENGTH];
        timestamp_bytes.copy_from_slice(&signed[1..1 + TIMESTAMP_LENGTH]);

        Ok(Self {
            version: signed[0],
            timestamp: u64::from_be_bytes(timestamp_bytes),
            iv: &signed[1 + TIMESTAMP_LENGTH..HEADER_LENGTH],
            ciphertext,
            signed,
            mac,
        })
    }
}
