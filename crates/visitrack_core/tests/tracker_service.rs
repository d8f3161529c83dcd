use std::cell::{Cell, RefCell};
use visitrack_core::service::{LocationView, PersonView};
use visitrack_core::storage::{
    encode_store, LocationRecord, PersonRecord, StorageResult, StoreRecords, VisitRecord,
};
use visitrack_core::{
    CommandError, DataStorage, EntityId, EntityStore, ParseError, StorageError, StoreError,
    TrackerService,
};

/// In-memory backend that counts saves and can be told to fail them.
#[derive(Default)]
struct MemoryStorage {
    saved: RefCell<Option<StoreRecords>>,
    saves: Cell<usize>,
    fail_saves: bool,
}

impl MemoryStorage {
    fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }
}

impl DataStorage for MemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn read_persons(&self) -> StorageResult<Option<Vec<PersonRecord>>> {
        Ok(self.saved.borrow().as_ref().map(|saved| saved.persons.clone()))
    }

    fn read_locations(&self) -> StorageResult<Option<Vec<LocationRecord>>> {
        Ok(self.saved.borrow().as_ref().map(|saved| saved.locations.clone()))
    }

    fn read_visits(&self) -> StorageResult<Option<Vec<VisitRecord>>> {
        Ok(self.saved.borrow().as_ref().map(|saved| saved.visits.clone()))
    }

    fn save(&self, store: &EntityStore) -> StorageResult<()> {
        if self.fail_saves {
            return Err(StorageError::Io {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(encode_store(store));
        Ok(())
    }
}

fn id(value: &str) -> EntityId {
    EntityId::new(value).unwrap()
}

fn sample_service() -> TrackerService<MemoryStorage> {
    TrackerService::bootstrap(MemoryStorage::default())
}

fn shown_person_ids(service: &TrackerService<MemoryStorage>) -> Vec<String> {
    service
        .shown_persons()
        .into_iter()
        .map(|person| person.id().to_string())
        .collect()
}

#[test]
fn bootstrap_without_saved_data_loads_samples() {
    let service = sample_service();

    assert_eq!(service.store().persons().len(), 5);
    assert_eq!(service.store().locations().len(), 4);
    assert_eq!(service.store().visits().len(), 7);
    assert_eq!(service.storage().saves.get(), 0);
}

#[test]
fn successful_mutation_is_saved() {
    let mut service = TrackerService::new(EntityStore::new(), MemoryStorage::default());

    let outcome = service
        .execute("add_person id/S1 n/Alice p/91234567 e/alice@example.com a/1 Main St")
        .unwrap();

    assert!(outcome.message.starts_with("New person added"));
    assert!(!outcome.exit);
    assert_eq!(service.storage().saves.get(), 1);
    let saved = service.storage().saved.borrow();
    assert_eq!(saved.as_ref().unwrap().persons[0].id, "S1");
}

#[test]
fn queries_and_rejected_commands_are_not_saved() {
    let mut service = sample_service();

    service.execute("list_persons").unwrap();
    service.execute("list_high_risk").unwrap();
    let err = service
        .execute("add_location id/L101 n/Somewhere a/1 Road")
        .unwrap_err();

    assert!(matches!(err, CommandError::Store(StoreError::Collection(_))));
    assert_eq!(service.storage().saves.get(), 0);
}

#[test]
fn add_visit_resolves_ids_and_reports_unknown_reference() {
    let mut service = sample_service();

    service.execute("add_visit p/S103 l/L101 d/2020-10-02").unwrap();
    let err = service
        .execute("add_visit p/S999 l/L101 d/2020-10-02")
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::Store(StoreError::UnknownReference { kind: "person", .. })
    ));
    assert_eq!(service.store().visits().len(), 8);
}

#[test]
fn edit_by_index_uses_the_shown_list_and_rewrites_visits() {
    let mut service = sample_service();
    service.execute("find_persons bernice").unwrap();
    assert_eq!(shown_person_ids(&service), ["S102"]);

    let outcome = service
        .execute("edit_person 1 a/8 Marina Blvd")
        .unwrap();

    assert!(outcome.message.contains("2 visit(s) updated"));
    let bernice = service.store().get_person_by_id(&id("S102")).unwrap();
    assert_eq!(bernice.address(), "8 Marina Blvd");
    assert!(service
        .store()
        .visits()
        .iter()
        .filter(|visit| visit.person_id() == &id("S102"))
        .all(|visit| visit.person() == bernice));
    assert_eq!(service.storage().saves.get(), 1);
}

#[test]
fn index_past_shown_list_is_rejected() {
    let mut service = sample_service();
    service.execute("list_infected").unwrap();
    assert_eq!(service.person_view(), &PersonView::Infected);

    let err = service.execute("delete_person 3").unwrap_err();

    assert!(matches!(
        err,
        CommandError::InvalidIndex {
            kind: "person",
            index: 3,
            shown: 2
        }
    ));
    assert_eq!(service.store().persons().len(), 5);
}

#[test]
fn delete_visit_index_refers_to_date_sorted_list() {
    let mut service = sample_service();

    service.execute("delete_visit 3").unwrap();

    let remaining: Vec<(String, String)> = service
        .shown_visits()
        .into_iter()
        .map(|visit| (visit.person_id().to_string(), visit.location_id().to_string()))
        .collect();
    assert_eq!(remaining.len(), 6);
    assert!(!remaining.contains(&("S102".to_string(), "L102".to_string())));
    assert!(remaining.contains(&("S104".to_string(), "L102".to_string())));
}

#[test]
fn contact_list_becomes_the_index_target() {
    let mut service = sample_service();

    service.execute("generate_persons id/S101").unwrap();
    assert_eq!(service.person_view(), &PersonView::ContactsOf(id("S101")));
    assert_eq!(shown_person_ids(&service), ["S102", "S105"]);

    service.execute("delete_person 2").unwrap();

    assert!(service.store().get_person_by_id(&id("S105")).is_err());
    assert!(service
        .store()
        .visits()
        .iter()
        .all(|visit| visit.person_id() != &id("S105")));
}

#[test]
fn generate_locations_shows_places_visited() {
    let mut service = sample_service();

    service.execute("generate_locations id/S102").unwrap();

    assert_eq!(service.location_view(), &LocationView::VisitedBy(id("S102")));
    let names: Vec<&str> = service
        .shown_locations()
        .into_iter()
        .map(|location| location.name())
        .collect();
    assert_eq!(names, ["Vivocity", "Jurong Point"]);
}

#[test]
fn delete_location_by_index_cascades() {
    let mut service = sample_service();
    service.execute("list_locations").unwrap();

    let outcome = service.execute("delete_location 1").unwrap();

    assert!(outcome.message.contains("2 visit(s) removed"));
    assert_eq!(service.store().visits().len(), 5);
}

#[test]
fn delete_visits_before_with_no_match_reports_nothing_to_delete() {
    let mut service = sample_service();

    let err = service
        .execute("delete_visits_before d/2019-01-01")
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::Store(StoreError::NothingToDelete { .. })
    ));
    assert_eq!(service.store().visits().len(), 7);
}

#[test]
fn failed_save_keeps_the_applied_change() {
    let mut service = TrackerService::new(EntityStore::new(), MemoryStorage::failing());

    let err = service
        .execute("add_location id/L1 n/Office a/9 Work Rd")
        .unwrap_err();

    assert!(matches!(err, CommandError::Storage(StorageError::Io { .. })));
    assert!(service.store().get_location_by_id(&id("L1")).is_ok());
}

#[test]
fn parse_errors_and_exit() {
    let mut service = sample_service();

    let err = service.execute("teleport S101").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Parse(ParseError::UnknownCommand(_))
    ));

    let help = service.execute("help").unwrap();
    assert!(help.message.contains("add_visit"));
    assert!(service.execute("exit").unwrap().exit);
}

#[test]
fn saved_state_reloads_through_bootstrap() {
    let mut service = sample_service();
    service
        .execute("add_location id/L105 n/Funan a/107 North Bridge Rd")
        .unwrap();
    let saved = service.storage().saved.borrow().clone();

    let storage = MemoryStorage {
        saved: RefCell::new(saved),
        ..MemoryStorage::default()
    };
    let reloaded = TrackerService::bootstrap(storage);

    assert_eq!(reloaded.store(), service.store());
}
