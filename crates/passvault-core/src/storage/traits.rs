//! Storage traits.
//!
//! Persistence is an external collaborator of the vault core. These traits
//! state what the core needs from it; [`SqliteStore`] is the bundled
//! implementation.
//!
//! [`SqliteStore`]: super::SqliteStore

use uuid::Uuid;

use super::types::{Category, EncryptionProfile, NewRecord, Record, UserId};
use crate::error::Result;

/// Storage for per-user encryption profiles.
///
/// Profiles are write-once: there is deliberately no update or replace
/// operation.
pub trait ProfileStore: Send + Sync {
    /// Get the profile for a user, if one exists.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<EncryptionProfile>>;

    /// Persist `candidate` unless its user already has a profile.
    ///
    /// Must be atomic: when several callers race on the same user, exactly
    /// one candidate is stored and every caller gets that stored profile
    /// back, never its own discarded candidate.
    fn insert_profile_if_absent(&self, candidate: EncryptionProfile) -> Result<EncryptionProfile>;
}

/// Storage for categories and credential records.
pub trait RecordStore: Send + Sync {
    /// Get a category by name, creating it if needed.
    fn get_or_create_category(&self, owner_id: &UserId, name: &str) -> Result<Category>;

    /// List an owner's categories ordered by name.
    fn list_categories(&self, owner_id: &UserId) -> Result<Vec<Category>>;

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if the category does not belong to
    /// the record owner.
    fn insert_record(&self, record: &NewRecord) -> Result<Record>;

    /// Overwrite the mutable fields of an existing record and bump
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::RecordNotFound` if no such record exists for the
    /// owner.
    fn update_record(&self, record: &Record) -> Result<Record>;

    /// Get a record by id, scoped to its owner.
    fn get_record(&self, owner_id: &UserId, id: &Uuid) -> Result<Option<Record>>;

    /// Find an owner's records by service name, case-insensitively.
    fn find_records(&self, owner_id: &UserId, service_name: &str) -> Result<Vec<Record>>;

    /// List an owner's records ordered by category, service name, username.
    fn list_records(&self, owner_id: &UserId) -> Result<Vec<Record>>;

    /// Delete a record. Returns `false` if it did not exist.
    fn delete_record(&self, owner_id: &UserId, id: &Uuid) -> Result<bool>;
}
