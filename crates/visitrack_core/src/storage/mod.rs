//! Persistence of the three entity collections.
//!
//! # Responsibility
//! - Convert the store to and from flat wire records.
//! - Provide JSON-file and SQLite backends behind `DataStorage`.
//! - Bootstrap a store at startup, falling back to sample or empty data.
//!
//! # Invariants
//! - Visits persist only person/location identifiers plus the date; on
//!   load each reference is re-resolved against the loaded collections.
//! - Persistence never interleaves with a store mutation.
//!
//! # See also
//! - `crate::db` for SQLite open and migrations.
//! - DESIGN.md (persistence fallbacks)

mod bootstrap;
mod json;
mod record;
pub mod sample;
mod sqlite;

use crate::db::DbError;
use crate::store::EntityStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use bootstrap::bootstrap_store;
pub use json::JsonStorage;
pub use record::{
    decode_locations, decode_persons, decode_store, decode_visits, encode_store, LocationRecord,
    PersonRecord, StoreRecords, VisitRecord,
};
pub use sqlite::{open_sqlite_or_fallback, unreadable_path, SqliteStorage};

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from reading, decoding or writing persisted data.
#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Db(DbError),
    /// Persisted data decoded but violates record or store rules.
    MalformedRecord(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid JSON data: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MalformedRecord(message) => write!(f, "malformed record: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MalformedRecord(_) => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage backend for the three record sets.
///
/// Readers return `Ok(None)` when the set has never been saved.
pub trait DataStorage {
    /// Short backend label for log events.
    fn backend(&self) -> &'static str;
    fn read_persons(&self) -> StorageResult<Option<Vec<PersonRecord>>>;
    fn read_locations(&self) -> StorageResult<Option<Vec<LocationRecord>>>;
    fn read_visits(&self) -> StorageResult<Option<Vec<VisitRecord>>>;
    /// Writes all three collections of `store`.
    fn save(&self, store: &EntityStore) -> StorageResult<()>;
}
