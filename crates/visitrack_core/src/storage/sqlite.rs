//! SQLite storage backend.
//!
//! # Invariants
//! - `save` rewrites all three tables in one transaction.
//! - Row order (`position`) mirrors collection insertion order.
//! - A collection without a `saved_collections` row reads as `None`.
//! - Startup never fails on an unreadable database file; it is moved
//!   aside and a fresh database takes its place.
//!
//! # See also
//! - `crate::db` for connection bootstrap and migrations.
//! - `super::bootstrap` for per-collection fallbacks once rows are read.

use super::record::{encode_store, LocationRecord, PersonRecord, VisitRecord};
use super::{DataStorage, StorageResult};
use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory};
use crate::store::EntityStore;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

const UNREADABLE_SUFFIX: &str = ".unreadable";

/// Opens the database at `path` for startup, recovering from a bad file.
///
/// When the file cannot be opened or migrated (not a database, or a newer
/// schema), it is renamed to `<file>.unreadable` and a fresh database is
/// created in its place, so bootstrap starts from sample data. When even
/// that fails, an in-memory database is returned and nothing is persisted.
///
/// # Errors
/// - Only when the in-memory fallback cannot be opened either.
pub fn open_sqlite_or_fallback(path: impl AsRef<Path>) -> StorageResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            warn!(
                "event=storage_bootstrap module=storage status=error backend=sqlite error_code=data_dir_unavailable error={err}"
            );
        }
    }

    let open_err = match open_db(path) {
        Ok(conn) => return Ok(conn),
        Err(err) => err,
    };

    let aside = unreadable_path(path);
    match std::fs::rename(path, &aside) {
        Ok(()) => {
            warn!(
                "event=storage_bootstrap module=storage status=fallback backend=sqlite fallback=fresh_file moved_to={} error={open_err}",
                aside.display()
            );
            match open_db(path) {
                Ok(conn) => return Ok(conn),
                Err(err) => warn!(
                    "event=storage_bootstrap module=storage status=fallback backend=sqlite fallback=memory error={err}"
                ),
            }
        }
        Err(err) => warn!(
            "event=storage_bootstrap module=storage status=fallback backend=sqlite fallback=memory error={open_err} rename_error={err}"
        ),
    }

    Ok(open_db_in_memory()?)
}

/// `<file>.unreadable` next to `path`.
pub fn unreadable_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("visitrack.sqlite3"));
    name.push(UNREADABLE_SUFFIX);
    path.with_file_name(name)
}

const PERSONS: &str = "persons";
const LOCATIONS: &str = "locations";
const VISITS: &str = "visits";

/// SQLite-backed storage over a migrated connection.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    /// Wraps a connection opened via `db::open_db*`.
    ///
    /// # Errors
    /// - `DbError::UnsupportedSchemaVersion` when the schema is not at the
    ///   version this binary expects.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if version != latest_version() {
            return Err(crate::db::DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest_version(),
            }
            .into());
        }
        Ok(Self { conn })
    }

    fn is_saved(&self, collection: &str) -> StorageResult<bool> {
        let saved = self
            .conn
            .query_row(
                "SELECT 1 FROM saved_collections WHERE name = ?1;",
                [collection],
                |_| Ok(()),
            )
            .optional()?;
        Ok(saved.is_some())
    }

    fn read_rows<T>(
        &self,
        collection: &str,
        sql: &str,
        parse: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StorageResult<Option<Vec<T>>> {
        if !self.is_saved(collection)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| parse(row))?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(Some(rows))
    }

    fn write_all(&self, store: &EntityStore) -> StorageResult<()> {
        let records = encode_store(store);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM visits; DELETE FROM persons; DELETE FROM locations;")?;

        for (position, person) in records.persons.iter().enumerate() {
            tx.execute(
                "INSERT INTO persons (
                    position, id, name, phone, email, address, quarantine_status, infection_status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    position as i64,
                    person.id,
                    person.name,
                    person.phone,
                    person.email,
                    person.address,
                    person.quarantine_status,
                    person.infection_status,
                ],
            )?;
        }
        for (position, location) in records.locations.iter().enumerate() {
            tx.execute(
                "INSERT INTO locations (position, id, name, address) VALUES (?1, ?2, ?3, ?4);",
                params![position as i64, location.id, location.name, location.address],
            )?;
        }
        for (position, visit) in records.visits.iter().enumerate() {
            tx.execute(
                "INSERT INTO visits (position, person_id, location_id, visit_date)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    position as i64,
                    visit.person_id,
                    visit.location_id,
                    visit.date
                ],
            )?;
        }
        for collection in [PERSONS, LOCATIONS, VISITS] {
            tx.execute(
                "INSERT INTO saved_collections (name, saved_at)
                 VALUES (?1, strftime('%s', 'now') * 1000)
                 ON CONFLICT(name) DO UPDATE SET saved_at = excluded.saved_at;",
                [collection],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl DataStorage for SqliteStorage<'_> {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn read_persons(&self) -> StorageResult<Option<Vec<PersonRecord>>> {
        self.read_rows(
            PERSONS,
            "SELECT id, name, phone, email, address, quarantine_status, infection_status
             FROM persons ORDER BY position ASC;",
            |row| {
                Ok(PersonRecord {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    phone: row.get("phone")?,
                    email: row.get("email")?,
                    address: row.get("address")?,
                    quarantine_status: row.get("quarantine_status")?,
                    infection_status: row.get("infection_status")?,
                })
            },
        )
    }

    fn read_locations(&self) -> StorageResult<Option<Vec<LocationRecord>>> {
        self.read_rows(
            LOCATIONS,
            "SELECT id, name, address FROM locations ORDER BY position ASC;",
            |row| {
                Ok(LocationRecord {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    address: row.get("address")?,
                })
            },
        )
    }

    fn read_visits(&self) -> StorageResult<Option<Vec<VisitRecord>>> {
        self.read_rows(
            VISITS,
            "SELECT person_id, location_id, visit_date FROM visits ORDER BY position ASC;",
            |row| {
                Ok(VisitRecord {
                    person_id: row.get("person_id")?,
                    location_id: row.get("location_id")?,
                    date: row.get("visit_date")?,
                })
            },
        )
    }

    fn save(&self, store: &EntityStore) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = self.write_all(store);
        match &result {
            Ok(()) => info!(
                "event=storage_save module=storage status=ok backend=sqlite duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_save module=storage status=error backend=sqlite duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}
