//! Authenticated encryption of secrets.
//!
//! Encrypt-then-MAC: AES-128-CBC with PKCS#7 padding under the encryption
//! half of the derived key, HMAC-SHA256 over the whole token under the
//! signing half. Decryption verifies the MAC before touching the ciphertext,
//! and every verification or padding failure is reported as the same
//! [`VaultError::AuthFailure`].

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::key::DerivedKey;
use super::token::{SecretToken, TokenParts, IV_LENGTH, MAC_LENGTH, TOKEN_VERSION};
use crate::error::{Result, VaultError};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Encrypt a secret under a derived key.
///
/// Every call draws a fresh random IV, so encrypting the same plaintext
/// twice yields two different tokens.
///
/// # Examples
///
/// ```
/// use passvault_core::crypto::{decrypt, derive_key, encrypt};
///
/// let key = derive_key(b"my-passphrase", &[7u8; 32]).unwrap();
/// let token = encrypt(b"hunter2", &key).unwrap();
/// assert_eq!(decrypt(&token, &key).unwrap().as_slice(), b"hunter2");
/// ```
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<SecretToken> {
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv)
        .map_err(|e| VaultError::Crypto(format!("Failed to generate IV: {}", e)))?;
    let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or(0);

    seal(plaintext, key, &iv, timestamp)
}

fn seal(plaintext: &[u8], key: &DerivedKey, iv: &[u8], timestamp: u64) -> Result<SecretToken> {
    let ciphertext = Aes128CbcEnc::new_from_slices(key.encryption_key(), iv)
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut bytes = Vec::with_capacity(1 + 8 + IV_LENGTH + ciphertext.len() + MAC_LENGTH);
    bytes.push(TOKEN_VERSION);
    bytes.extend_from_slice(&timestamp.to_be_bytes());
    bytes.extend_from_slice(iv);
    bytes.extend_from_slice(&ciphertext);

    let mut mac = signer(key)?;
    mac.update(&bytes);
    bytes.extend_from_slice(&mac.finalize().into_bytes());

    Ok(SecretToken::from_raw(&bytes))
}

/// Decrypt a token under a derived key.
///
/// # Errors
///
/// - `VaultError::MalformedToken` if the token is structurally invalid, or
///   authenticates but carries an unknown version
/// - `VaultError::AuthFailure` if the MAC does not verify (wrong key,
///   corruption, tampering) or the padding is invalid
pub fn decrypt(token: &SecretToken, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = token.to_bytes()?;
    let parts = verify(&bytes, key)?;

    Aes128CbcDec::new_from_slices(key.encryption_key(), parts.iv)
        .map_err(|_| VaultError::AuthFailure)?
        .decrypt_padded_vec_mut::<Pkcs7>(parts.ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::AuthFailure)
}

/// When a token was sealed, after verifying it under `key`.
pub fn issued_at(token: &SecretToken, key: &DerivedKey) -> Result<DateTime<Utc>> {
    let bytes = token.to_bytes()?;
    let parts = verify(&bytes, key)?;
    i64::try_from(parts.timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| VaultError::MalformedToken("Timestamp out of range".to_string()))
}

fn verify<'a>(bytes: &'a [u8], key: &DerivedKey) -> Result<TokenParts<'a>> {
    let parts = TokenParts::parse(bytes)?;

    let mut mac = signer(key)?;
    mac.update(parts.signed);
    mac.verify_slice(parts.mac)
        .map_err(|_| VaultError::AuthFailure)?;

    if parts.version != TOKEN_VERSION {
        return Err(VaultError::MalformedToken(format!(
            "Unsupported token version 0x{:02x}",
            parts.version
        )));
    }

    Ok(parts)
}

fn signer(key: &DerivedKey) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key.signing_key())
        .map_err(|e| VaultError::Crypto(format!("Failed to create MAC: {}", e)))
}
