//! Storage abstractions and the SQLite backend.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::{ProfileStore, RecordStore};
pub use types::{Category, EncryptionProfile, NewRecord, Record, UserId};
