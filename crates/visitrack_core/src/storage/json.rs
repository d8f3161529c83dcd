//! JSON-file storage backend: one file per collection.
//!
//! # Invariants
//! - Each file is replaced atomically; readers never see a partial write.
//! - A missing file means the collection was never saved.

use super::record::{encode_store, LocationRecord, PersonRecord, VisitRecord};
use super::{DataStorage, StorageError, StorageResult};
use crate::store::EntityStore;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const PERSONS_FILE: &str = "persons.json";
const LOCATIONS_FILE: &str = "locations.json";
const VISITS_FILE: &str = "visits.json";

#[derive(Serialize, Deserialize)]
struct PersonsFile {
    persons: Vec<PersonRecord>,
}

#[derive(Serialize, Deserialize)]
struct LocationsFile {
    locations: Vec<LocationRecord>,
}

#[derive(Serialize, Deserialize)]
struct VisitsFile {
    visits: Vec<VisitRecord>,
}

/// Stores `persons.json`, `locations.json` and `visits.json` under one
/// data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn persons_path(&self) -> PathBuf {
        self.data_dir.join(PERSONS_FILE)
    }

    pub fn locations_path(&self) -> PathBuf {
        self.data_dir.join(LOCATIONS_FILE)
    }

    pub fn visits_path(&self) -> PathBuf {
        self.data_dir.join(VISITS_FILE)
    }

    fn write_all(&self, store: &EntityStore) -> StorageResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| StorageError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let records = encode_store(store);
        write_json(
            &self.persons_path(),
            &PersonsFile {
                persons: records.persons,
            },
        )?;
        write_json(
            &self.locations_path(),
            &LocationsFile {
                locations: records.locations,
            },
        )?;
        write_json(
            &self.visits_path(),
            &VisitsFile {
                visits: records.visits,
            },
        )
    }
}

impl DataStorage for JsonStorage {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn read_persons(&self) -> StorageResult<Option<Vec<PersonRecord>>> {
        Ok(read_json::<PersonsFile>(&self.persons_path())?.map(|file| file.persons))
    }

    fn read_locations(&self) -> StorageResult<Option<Vec<LocationRecord>>> {
        Ok(read_json::<LocationsFile>(&self.locations_path())?.map(|file| file.locations))
    }

    fn read_visits(&self) -> StorageResult<Option<Vec<VisitRecord>>> {
        Ok(read_json::<VisitsFile>(&self.visits_path())?.map(|file| file.visits))
    }

    fn save(&self, store: &EntityStore) -> StorageResult<()> {
        let started_at = Instant::now();
        match self.write_all(store) {
            Ok(()) => {
                info!(
                    "event=storage_save module=storage status=ok backend=json duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error backend=json duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

/// Returns `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Writes `value` to a temp file beside `path`, then renames it over
/// `path`, so an interrupted save leaves the previous file intact.
fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let io_error = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}
