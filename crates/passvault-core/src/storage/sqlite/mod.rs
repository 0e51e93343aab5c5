//! SQLite storage backend.
//!
//! Holds encryption profiles, categories and records in a single database
//! file. Secrets are stored as encoded tokens only; nothing in here ever
//! sees a plaintext secret or a passphrase.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::storage::traits::{ProfileStore, RecordStore};
use crate::storage::types::{Category, EncryptionProfile, NewRecord, Record, UserId};

use row::{CategoryRow, ProfileRow, RecordRow, RECORD_COLUMNS};

/// How long a writer waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS encryption_profiles (
        user_id TEXT PRIMARY KEY,
        salt BLOB NOT NULL,
        kdf_iterations INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (owner_id, name)
    );

    CREATE TABLE IF NOT EXISTS records (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        service_name TEXT NOT NULL,
        service_url TEXT NOT NULL DEFAULT '',
        username TEXT NOT NULL,
        encrypted_secret TEXT,
        comments TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_owner_service
        ON records (owner_id, service_name);
"#;

/// SQLite-backed profile and record store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Record>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, RecordRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Record::try_from(row?)?);
        }
        Ok(records)
    }

    fn select_profile(conn: &Connection, user_id: &UserId) -> Result<Option<EncryptionProfile>> {
        let row = conn
            .query_row(
                "SELECT user_id, salt, kdf_iterations, created_at
                 FROM encryption_profiles WHERE user_id = ?",
                [user_id.as_str()],
                |row| {
                    Ok(ProfileRow {
                        user_id: row.get(0)?,
                        salt: row.get(1)?,
                        kdf_iterations: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        row.map(EncryptionProfile::try_from).transpose()
    }
}

impl ProfileStore for SqliteStore {
    fn get_profile(&self, user_id: &UserId) -> Result<Option<EncryptionProfile>> {
        let conn = self.lock_conn()?;
        Self::select_profile(&conn, user_id)
    }

    fn insert_profile_if_absent(&self, candidate: EncryptionProfile) -> Result<EncryptionProfile> {
        let conn = self.lock_conn()?;

        // INSERT OR IGNORE is the atomic step; a concurrent writer on another
        // connection either wins before us (we ignore) or after us (it ignores).
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO encryption_profiles (user_id, salt, kdf_iterations, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                candidate.user_id.as_str(),
                candidate.salt.as_slice(),
                i64::from(candidate.kdf_iterations),
                candidate.created_at.to_rfc3339(),
            ],
        )?;
        if inserted == 1 {
            info!(user = %candidate.user_id, "created encryption profile");
        }

        Self::select_profile(&conn, &candidate.user_id)?.ok_or_else(|| {
            VaultError::Storage(format!(
                "Encryption profile for {} vanished after insert",
                candidate.user_id
            ))
        })
    }
}

impl RecordStore for SqliteStore {
    fn get_or_create_category(&self, owner_id: &UserId, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock_conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO categories (id, owner_id, name, created_at) VALUES (?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                owner_id.as_str(),
                name,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if inserted == 1 {
            debug!(user = %owner_id, category = name, "created category");
        }

        let row = conn.query_row(
            "SELECT id, owner_id, name, created_at FROM categories WHERE owner_id = ? AND name = ?",
            params![owner_id.as_str(), name],
            |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?;
        row.try_into()
    }

    fn list_categories(&self, owner_id: &UserId) -> Result<Vec<Category>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, created_at FROM categories WHERE owner_id = ? ORDER BY name",
        )?;
        let rows = stmt.query_map([owner_id.as_str()], |row| {
            Ok(CategoryRow {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(Category::try_from(row?)?);
        }
        Ok(categories)
    }

    fn insert_record(&self, record: &NewRecord) -> Result<Record> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let owns_category: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM categories WHERE id = ? AND owner_id = ?",
            params![record.category_id.to_string(), record.owner_id.as_str()],
            |row| row.get(0),
        )?;
        if !owns_category {
            return Err(VaultError::InvalidInput(format!(
                "Category {} does not belong to {}",
                record.category_id, record.owner_id
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        tx.execute(
            r#"
            INSERT INTO records (
                id, owner_id, category_id, service_name, service_url,
                username, encrypted_secret, comments, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id.to_string(),
                record.owner_id.as_str(),
                record.category_id.to_string(),
                record.service_name,
                record.service_url,
                record.username,
                record.encrypted_secret.as_ref().map(|token| token.encode()),
                record.comments,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        Ok(Record {
            id,
            owner_id: record.owner_id.clone(),
            category_id: record.category_id,
            service_name: record.service_name.clone(),
            service_url: record.service_url.clone(),
            username: record.username.clone(),
            encrypted_secret: record.encrypted_secret.clone(),
            comments: record.comments.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn update_record(&self, record: &Record) -> Result<Record> {
        let conn = self.lock_conn()?;
        let now = Utc::now();

        let changed = conn.execute(
            r#"
            UPDATE records
            SET category_id = ?, service_name = ?, service_url = ?, username = ?,
                encrypted_secret = ?, comments = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
            params![
                record.category_id.to_string(),
                record.service_name,
                record.service_url,
                record.username,
                record.encrypted_secret.as_ref().map(|token| token.encode()),
                record.comments,
                now.to_rfc3339(),
                record.id.to_string(),
                record.owner_id.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(VaultError::RecordNotFound(record.id));
        }

        let mut updated = record.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    fn get_record(&self, owner_id: &UserId, id: &Uuid) -> Result<Option<Record>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM records r WHERE r.id = ? AND r.owner_id = ?",
            RECORD_COLUMNS
        );
        let records =
            Self::query_records(&conn, &sql, params![id.to_string(), owner_id.as_str()])?;
        Ok(records.into_iter().next())
    }

    fn find_records(&self, owner_id: &UserId, service_name: &str) -> Result<Vec<Record>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM records r
             WHERE r.owner_id = ? AND lower(r.service_name) = lower(?)
             ORDER BY r.service_name, r.username",
            RECORD_COLUMNS
        );
        Self::query_records(&conn, &sql, params![owner_id.as_str(), service_name.trim()])
    }

    fn list_records(&self, owner_id: &UserId) -> Result<Vec<Record>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM records r
             JOIN categories c ON c.id = r.category_id
             WHERE r.owner_id = ?
             ORDER BY c.name, r.service_name, r.username",
            RECORD_COLUMNS
        );
        Self::query_records(&conn, &sql, [owner_id.as_str()])
    }

    fn delete_record(&self, owner_id: &UserId, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM records WHERE id = ? AND owner_id = ?",
            params![id.to_string(), owner_id.as_str()],
        )?;
        Ok(deleted > 0)
    }
}
