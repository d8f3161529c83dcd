use serde_json::Value;
use visitrack_core::db::open_db_in_memory;
use visitrack_core::storage::sample::sample_records;
use visitrack_core::storage::{decode_store, encode_store, unreadable_path, VisitRecord};
use visitrack_core::{
    bootstrap_store, open_sqlite_or_fallback, DataStorage, EntityId, EntityStore, JsonStorage,
    Location, SqliteStorage, StorageError,
};

fn sample_store() -> EntityStore {
    decode_store(&sample_records()).unwrap()
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn sample_records_decode_into_consistent_store() {
    let store = sample_store();

    assert_eq!(store.persons().len(), 5);
    assert_eq!(store.locations().len(), 4);
    assert_eq!(store.visits().len(), 7);
    assert_eq!(encode_store(&store), sample_records());
}

#[test]
fn json_storage_round_trips_store() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path().join("data"));
    let store = sample_store();

    storage.save(&store).unwrap();
    let loaded = bootstrap_store(&storage);

    assert_eq!(loaded, store);
}

#[test]
fn json_files_use_camel_case_and_visit_ids_only() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());
    storage.save(&sample_store()).unwrap();

    let persons = read_json(&storage.persons_path());
    let bernice = &persons["persons"][1];
    assert_eq!(bernice["id"], "S102");
    assert_eq!(bernice["quarantineStatus"], "2020-10-01");
    assert_eq!(bernice["infectionStatus"], "2020-09-28");

    let visits = read_json(&storage.visits_path());
    let first = visits["visits"][0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["date", "locationId", "personId"]);
    assert_eq!(first["personId"], "S101");
    assert_eq!(first["date"], "2020-09-20");

    let locations = read_json(&storage.locations_path());
    assert_eq!(locations["locations"].as_array().unwrap().len(), 4);
}

#[test]
fn json_storage_reads_missing_files_as_unsaved() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());

    assert!(storage.read_persons().unwrap().is_none());
    assert!(storage.read_visits().unwrap().is_none());
}

#[test]
fn json_storage_reports_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());
    std::fs::write(storage.locations_path(), "{ not json").unwrap();

    let err = storage.read_locations().unwrap_err();
    assert!(matches!(err, StorageError::Json(_)));
}

#[test]
fn sqlite_storage_round_trips_and_overwrites() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    assert!(storage.read_persons().unwrap().is_none());

    let mut store = sample_store();
    storage.save(&store).unwrap();
    assert_eq!(bootstrap_store(&storage), store);

    let vivocity = store
        .get_location_by_id(&EntityId::new("L101").unwrap())
        .unwrap()
        .clone();
    store.delete_location(&vivocity).unwrap();
    let mall = Location::new(EntityId::new("L200").unwrap(), "Funan", "107 North Bridge Rd")
        .unwrap();
    store.add_location(mall).unwrap();
    storage.save(&store).unwrap();

    let loaded = bootstrap_store(&storage);
    assert_eq!(loaded, store);
    assert_eq!(loaded.locations().len(), 4);
    assert_eq!(loaded.visits().len(), 5);
}

#[test]
fn sqlite_storage_keeps_empty_saved_collections_distinct_from_unsaved() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();

    storage.save(&EntityStore::new()).unwrap();

    assert_eq!(storage.read_persons().unwrap(), Some(Vec::new()));
    assert_eq!(bootstrap_store(&storage), EntityStore::new());
}

#[test]
fn unknown_visit_reference_is_malformed() {
    let mut records = sample_records();
    records.visits.push(VisitRecord {
        person_id: "S999".to_string(),
        location_id: "L101".to_string(),
        date: "2020-10-05".to_string(),
    });

    let err = decode_store(&records).unwrap_err();

    match err {
        StorageError::MalformedRecord(message) => assert!(message.contains("S999")),
        other => panic!("expected malformed record, got {other:?}"),
    }
}

#[test]
fn invalid_fields_and_duplicates_are_malformed() {
    let mut records = sample_records();
    records.persons[0].phone = "12".to_string();
    assert!(matches!(
        decode_store(&records).unwrap_err(),
        StorageError::MalformedRecord(_)
    ));

    let mut records = sample_records();
    records.locations[1].id = "L101".to_string();
    assert!(matches!(
        decode_store(&records).unwrap_err(),
        StorageError::MalformedRecord(_)
    ));

    let mut records = sample_records();
    let repeated = records.visits[0].clone();
    records.visits.push(repeated);
    assert!(matches!(
        decode_store(&records).unwrap_err(),
        StorageError::MalformedRecord(_)
    ));
}

#[test]
fn bootstrap_uses_sample_data_when_nothing_was_saved() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());

    assert_eq!(bootstrap_store(&storage), sample_store());
}

#[test]
fn bootstrap_replaces_malformed_collection_with_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());
    std::fs::write(storage.persons_path(), "[1, 2, 3]").unwrap();

    let store = bootstrap_store(&storage);

    assert!(store.persons().is_empty());
    assert_eq!(store.locations().len(), 4);
    // Sample visits reference sample people, which were not loaded.
    assert!(store.visits().is_empty());
}

#[test]
fn bootstrap_prefers_saved_data() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());
    let mut store = sample_store();
    store
        .delete_visits_on_or_before(chrono::NaiveDate::from_ymd_opt(2020, 9, 30).unwrap())
        .unwrap();
    storage.save(&store).unwrap();

    let loaded = bootstrap_store(&storage);

    assert_eq!(loaded, store);
    assert_eq!(loaded.visits().len(), 2);
}

#[test]
fn json_save_replaces_files_without_leaving_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::new(dir.path());
    let mut store = sample_store();
    storage.save(&store).unwrap();

    store
        .delete_visits_on_or_before(chrono::NaiveDate::from_ymd_opt(2020, 12, 31).unwrap())
        .unwrap();
    storage.save(&store).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["locations.json", "persons.json", "visits.json"]);
    assert_eq!(storage.read_visits().unwrap(), Some(Vec::new()));
}

#[test]
fn unreadable_sqlite_file_is_moved_aside_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("visitrack.sqlite3");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"definitely not a sqlite database, just some garbage bytes").unwrap();

    let conn = open_sqlite_or_fallback(&path).unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();

    assert_eq!(bootstrap_store(&storage), sample_store());
    let aside = unreadable_path(&path);
    assert_eq!(aside.file_name().unwrap(), "visitrack.sqlite3.unreadable");
    assert!(std::fs::read(&aside).unwrap().starts_with(b"definitely not"));

    storage.save(&EntityStore::new()).unwrap();
    drop(storage);
    drop(conn);
    let reopened = open_sqlite_or_fallback(&path).unwrap();
    let storage = SqliteStorage::try_new(&reopened).unwrap();
    assert_eq!(bootstrap_store(&storage), EntityStore::new());
}

#[test]
fn sqlite_file_with_newer_schema_falls_back_to_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visitrack.sqlite3");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let conn = open_sqlite_or_fallback(&path).unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();

    assert_eq!(bootstrap_store(&storage), sample_store());
    assert!(unreadable_path(&path).exists());
}

#[test]
fn missing_sqlite_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.sqlite3");

    let conn = open_sqlite_or_fallback(&path).unwrap();

    assert!(SqliteStorage::try_new(&conn).is_ok());
    assert!(path.exists());
    assert!(!unreadable_path(&path).exists());
}
