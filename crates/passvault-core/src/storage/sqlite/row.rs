//! Row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::{SecretToken, SALT_LENGTH};
use crate::error::{Result, VaultError};
use crate::storage::types::{Category, EncryptionProfile, Record, UserId};

pub const RECORD_COLUMNS: &str = "r.id, r.owner_id, r.category_id, r.service_name, r.service_url, \
     r.username, r.encrypted_secret, r.comments, r.created_at, r.updated_at";

/// Raw row data from the records table, before parsing into domain types.
#[derive(Debug)]
pub struct RecordRow {
    pub id: String,
    pub owner_id: String,
    pub category_id: String,
    pub service_name: String,
    pub service_url: String,
    pub username: String,
    pub encrypted_secret: Option<String>,
    pub comments: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RecordRow {
    /// Read a row selected with [`RECORD_COLUMNS`].
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            category_id: row.get(2)?,
            service_name: row.get(3)?,
            service_url: row.get(4)?,
            username: row.get(5)?,
            encrypted_secret: row.get(6)?,
            comments: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<RecordRow> for Record {
    type Error = VaultError;

    fn try_from(row: RecordRow) -> Result<Self> {
        // Decoded on reveal, so one damaged token never hides the others
        let encrypted_secret = row
            .encrypted_secret
            .filter(|value| !value.is_empty())
            .map(SecretToken::from_stored);

        Ok(Record {
            id: parse_uuid(&row.id, "record")?,
            owner_id: UserId::new(row.owner_id)?,
            category_id: parse_uuid(&row.category_id, "category")?,
            service_name: row.service_name,
            service_url: row.service_url,
            username: row.username,
            encrypted_secret,
            comments: row.comments,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the categories table.
#[derive(Debug)]
pub struct CategoryRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = VaultError;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Category {
            id: parse_uuid(&row.id, "category")?,
            owner_id: UserId::new(row.owner_id)?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Raw row data from the encryption_profiles table.
#[derive(Debug)]
pub struct ProfileRow {
    pub user_id: String,
    pub salt: Vec<u8>,
    pub kdf_iterations: i64,
    pub created_at: String,
}

impl TryFrom<ProfileRow> for EncryptionProfile {
    type Error = VaultError;

    fn try_from(row: ProfileRow) -> Result<Self> {
        let salt: [u8; SALT_LENGTH] = row.salt.as_slice().try_into().map_err(|_| {
            VaultError::Storage(format!(
                "Corrupted salt for {} (expected {} bytes, got {})",
                row.user_id,
                SALT_LENGTH,
                row.salt.len()
            ))
        })?;
        let kdf_iterations = u32::try_from(row.kdf_iterations)
            .map_err(|_| VaultError::Storage("Invalid KDF iteration count".to_string()))?;

        Ok(EncryptionProfile {
            user_id: UserId::new(row.user_id)?,
            salt,
            kdf_iterations,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| VaultError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}
