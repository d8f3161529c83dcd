//! Startup loading with per-collection fallbacks.

use super::record::{decode_locations, decode_persons, decode_visits};
use super::sample::{sample_locations, sample_persons, sample_visits};
use super::{DataStorage, StorageResult};
use crate::store::EntityStore;
use log::{info, warn};

/// Loads a store from `storage`, never failing.
///
/// Per collection: a set that was never saved is replaced by sample data,
/// a set that cannot be read or decoded is replaced by an empty set.
/// Visits are resolved against the people and locations actually loaded.
pub fn bootstrap_store(storage: &dyn DataStorage) -> EntityStore {
    let backend = storage.backend();

    let persons = load_collection(
        backend,
        "persons",
        storage.read_persons(),
        sample_persons,
        decode_persons,
    );
    let locations = load_collection(
        backend,
        "locations",
        storage.read_locations(),
        sample_locations,
        decode_locations,
    );
    let visits = load_collection(
        backend,
        "visits",
        storage.read_visits(),
        sample_visits,
        |records| decode_visits(records, &persons, &locations),
    );

    match EntityStore::from_records(persons, locations, visits) {
        Ok(store) => store,
        Err(err) => {
            warn!(
                "event=storage_bootstrap module=storage status=fallback backend={backend} fallback=empty error_code={}",
                err.code()
            );
            EntityStore::new()
        }
    }
}

fn load_collection<R, T>(
    backend: &str,
    collection: &str,
    read: StorageResult<Option<Vec<R>>>,
    sample: impl FnOnce() -> Vec<R>,
    decode: impl Fn(&[R]) -> StorageResult<Vec<T>>,
) -> Vec<T> {
    let (records, source) = match read {
        Ok(Some(records)) => (records, "saved"),
        Ok(None) => (sample(), "sample"),
        Err(err) => {
            warn!(
                "event=storage_bootstrap module=storage status=fallback backend={backend} collection={collection} fallback=empty error={err}"
            );
            return Vec::new();
        }
    };

    match decode(&records) {
        Ok(decoded) => {
            info!(
                "event=storage_bootstrap module=storage status=ok backend={backend} collection={collection} source={source} count={}",
                decoded.len()
            );
            decoded
        }
        Err(err) => {
            warn!(
                "event=storage_bootstrap module=storage status=fallback backend={backend} collection={collection} source={source} fallback=empty error={err}"
            );
            Vec::new()
        }
    }
}
