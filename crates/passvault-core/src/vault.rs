//! The vault: the operations a caller composes from profiles, key
//! derivation, the cipher and the record store.
//!
//! The passphrase only ever arrives as a parameter. Callers that need more
//! than one operation per request should [`Vault::unlock`] once and pass the
//! resulting [`UserKey`] around, since each derivation costs a full PBKDF2
//! run.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, DerivedKey, KeyDerivation, SecretToken};
use crate::error::{Result, VaultError};
use crate::import::{ImportParser, ImportSkipped, SkipReason};
use crate::profile;
use crate::storage::{
    Category, EncryptionProfile, NewRecord, ProfileStore, Record, RecordStore, UserId,
};

/// Category that imported records land in unless configured otherwise.
pub const DEFAULT_IMPORT_CATEGORY: &str = "personal";

/// A user's derived key, valid for one request or import run.
///
/// Never persisted; the key is zeroized on drop.
#[derive(Debug)]
pub struct UserKey {
    user_id: UserId,
    key: DerivedKey,
}

impl UserKey {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn key(&self) -> &DerivedKey {
        &self.key
    }
}

/// Fields for a new record. An empty secret stores no token.
#[derive(Debug)]
pub struct RecordDraft {
    pub category: String,
    pub service_name: String,
    pub service_url: String,
    pub username: String,
    pub secret: SecretString,
    pub comments: String,
}

/// Changes to an existing record; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct RecordUpdate {
    pub category: Option<String>,
    pub service_name: Option<String>,
    pub service_url: Option<String>,
    pub username: Option<String>,
    /// A new secret to seal. An empty or absent secret keeps the current one.
    pub secret: Option<SecretString>,
    pub comments: Option<String>,
}

/// Outcome of an import run.
#[derive(Debug)]
pub struct ImportReport {
    pub category: Category,
    pub records: Vec<Record>,
    pub warnings: Vec<ImportSkipped>,
}

/// Password vault over a profile and record store.
pub struct Vault<S> {
    store: S,
    kdf: KeyDerivation,
    import_category: String,
}

impl<S> Vault<S>
where
    S: ProfileStore + RecordStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            kdf: KeyDerivation::default(),
            import_category: DEFAULT_IMPORT_CATEGORY.to_string(),
        }
    }

    /// Key derivation used for profiles created from now on. Existing
    /// profiles keep the parameters they were created with.
    pub fn with_kdf(mut self, kdf: KeyDerivation) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_import_category(mut self, category: impl Into<String>) -> Self {
        self.import_category = category.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the user's encryption profile, creating it on first use.
    pub fn get_or_create_profile(&self, user_id: &UserId) -> Result<EncryptionProfile> {
        profile::get_or_create(&self.store, user_id, self.kdf)
    }

    /// Derive the user's key once for a series of operations.
    pub fn unlock(&self, user_id: &UserId, passphrase: &SecretString) -> Result<UserKey> {
        let profile = self.get_or_create_profile(user_id)?;
        let key = profile::key_derivation(&profile)?
            .derive(passphrase.expose_secret().as_bytes(), &profile.salt)?;
        debug!(user = %user_id, "derived user key");

        Ok(UserKey {
            user_id: user_id.clone(),
            key,
        })
    }

    /// Profile lookup, derivation and encryption in one call.
    pub fn encrypt_secret(
        &self,
        user_id: &UserId,
        passphrase: &SecretString,
        plaintext: &[u8],
    ) -> Result<SecretToken> {
        let key = self.unlock(user_id, passphrase)?;
        encrypt(plaintext, key.key())
    }

    /// Profile lookup, derivation and decryption in one call.
    ///
    /// # Errors
    ///
    /// `VaultError::AuthFailure` when the passphrase does not unlock the
    /// token, `VaultError::MalformedToken` when the token is corrupt beyond
    /// parsing, `VaultError::InvalidInput` for an empty passphrase.
    pub fn decrypt_secret(
        &self,
        user_id: &UserId,
        passphrase: &SecretString,
        token: &SecretToken,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.unlock(user_id, passphrase)?;
        decrypt(token, key.key())
    }

    /// Import a flat-text dump for a user.
    ///
    /// Derives the key once for the whole run. Each service is saved as soon
    /// as it is built, before the next one is parsed; a service that fails to
    /// parse, encrypt or save becomes a warning and never affects the records
    /// saved before it.
    pub fn import_from_text<I, T>(
        &self,
        user_id: &UserId,
        passphrase: &SecretString,
        lines: I,
    ) -> Result<ImportReport>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let key = self.unlock(user_id, passphrase)?;
        let category = self
            .store
            .get_or_create_category(user_id, &self.import_category)?;

        let mut records = Vec::new();
        let parser = ImportParser::new(user_id.clone(), category.id, key.key());
        let warnings = parser.run(lines, |record| {
            let saved = self
                .store
                .insert_record(&record)
                .map_err(|e| SkipReason::Storage(e.to_string()))?;
            debug!(service = %saved.service_name, id = %saved.id, "imported record");
            records.push(saved);
            Ok(())
        });

        info!(
            user = %user_id,
            imported = records.len(),
            skipped = warnings.len(),
            "import finished"
        );
        Ok(ImportReport {
            category,
            records,
            warnings,
        })
    }

    /// Save a new record, sealing its secret under `key`.
    pub fn add_record(&self, key: &UserKey, draft: RecordDraft) -> Result<Record> {
        let service_name = required(&draft.service_name, "Service name")?;
        let category = self
            .store
            .get_or_create_category(key.user_id(), &draft.category)?;

        let mut record = NewRecord::new(
            key.user_id().clone(),
            category.id,
            service_name,
            draft.username,
        )
        .with_service_url(draft.service_url)
        .with_comments(draft.comments);

        let secret = draft.secret.expose_secret();
        if !secret.is_empty() {
            record = record.with_secret(encrypt(secret.as_bytes(), key.key())?);
        }

        self.store.insert_record(&record)
    }

    /// Apply `update` to the record `id`, resealing the secret if a new one
    /// is given.
    pub fn update_record(&self, key: &UserKey, id: &Uuid, update: RecordUpdate) -> Result<Record> {
        let mut record = self.get_record(key.user_id(), id)?;

        if let Some(category) = update.category {
            record.category_id = self
                .store
                .get_or_create_category(key.user_id(), &category)?
                .id;
        }
        if let Some(service_name) = update.service_name {
            record.service_name = required(&service_name, "Service name")?;
        }
        if let Some(service_url) = update.service_url {
            record.service_url = service_url;
        }
        if let Some(username) = update.username {
            record.username = username;
        }
        if let Some(comments) = update.comments {
            record.comments = comments;
        }
        if let Some(secret) = update.secret {
            let secret = secret.expose_secret();
            if !secret.is_empty() {
                record.encrypted_secret = Some(encrypt(secret.as_bytes(), key.key())?);
            }
        }

        self.store.update_record(&record)
    }

    /// Decrypt a record's secret.
    ///
    /// Returns `Ok(None)` when the record has no secret stored, which is
    /// distinct from a secret that does not unlock.
    pub fn reveal_secret(&self, key: &UserKey, record: &Record) -> Result<Option<SecretString>> {
        if &record.owner_id != key.user_id() {
            return Err(VaultError::InvalidInput(format!(
                "Record {} does not belong to {}",
                record.id,
                key.user_id()
            )));
        }

        let Some(token) = record.encrypted_secret.as_ref() else {
            return Ok(None);
        };
        let plaintext = decrypt(token, key.key())?;
        let secret = String::from_utf8(plaintext.to_vec())
            .map_err(|_| VaultError::MalformedToken("Secret is not valid UTF-8".to_string()))?;
        Ok(Some(SecretString::from(secret)))
    }

    pub fn get_record(&self, user_id: &UserId, id: &Uuid) -> Result<Record> {
        self.store
            .get_record(user_id, id)?
            .ok_or(VaultError::RecordNotFound(*id))
    }

    pub fn find_records(&self, user_id: &UserId, service_name: &str) -> Result<Vec<Record>> {
        self.store.find_records(user_id, service_name)
    }

    pub fn list_records(&self, user_id: &UserId) -> Result<Vec<Record>> {
        self.store.list_records(user_id)
    }

    pub fn list_categories(&self, user_id: &UserId) -> Result<Vec<Category>> {
        self.store.list_categories(user_id)
    }

    pub fn delete_record(&self, user_id: &UserId, id: &Uuid) -> Result<()> {
        if self.store.delete_record(user_id, id)? {
            Ok(())
        } else {
            Err(VaultError::RecordNotFound(*id))
        }
    }
}

fn required(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VaultError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(value.to_string())
}

/// Show the first three characters of a secret and hide the rest.
///
/// Secrets of three characters or fewer are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 3 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(3).collect();
    format!("{}***", prefix)
}
