//! Core data types for the storage layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{SecretToken, SALT_LENGTH};
use crate::error::{Result, VaultError};

/// Verified user identifier handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if the id is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "User id cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-user key derivation parameters.
///
/// Created once, never updated. Replacing the salt would orphan every
/// token ever sealed for this user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionProfile {
    pub user_id: UserId,
    pub salt: [u8; SALT_LENGTH],
    /// PBKDF2 rounds used for every key derived under this profile
    pub kdf_iterations: u32,
    pub created_at: DateTime<Utc>,
}

/// A named group of records, unique per owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A stored credential.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: UserId,
    pub category_id: Uuid,
    pub service_name: String,
    /// Empty when the service has no URL
    pub service_url: String,
    pub username: String,
    /// `None` when no secret was ever stored
    pub encrypted_secret: Option<SecretToken>,
    /// Empty when there are no comments
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub owner_id: UserId,
    pub category_id: Uuid,
    pub service_name: String,
    pub service_url: String,
    pub username: String,
    pub encrypted_secret: Option<SecretToken>,
    pub comments: String,
}

impl NewRecord {
    pub fn new(
        owner_id: UserId,
        category_id: Uuid,
        service_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            category_id,
            service_name: service_name.into(),
            service_url: String::new(),
            username: username.into(),
            encrypted_secret: None,
            comments: String::new(),
        }
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_secret(mut self, token: SecretToken) -> Self {
        self.encrypted_secret = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert_eq!(UserId::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_new_record_builder() {
        let owner = UserId::new("alice").unwrap();
        let category = Uuid::new_v4();
        let record = NewRecord::new(owner.clone(), category, "Bank", "alice")
            .with_service_url("https://bank.example")
            .with_comments("joint account");

        assert_eq!(record.owner_id, owner);
        assert_eq!(record.category_id, category);
        assert_eq!(record.service_url, "https://bank.example");
        assert_eq!(record.comments, "joint account");
        assert!(record.encrypted_secret.is_none());
    }
}
