//! Relational entity store.
//!
//! # Responsibility
//! - Compose the person, location and visit collections.
//! - Be the only mutation surface, keeping visits consistent with the
//!   records they reference.
//!
//! # Invariants
//! - Every operation is atomic: it is fully applied or rejected with no
//!   state change.
//! - After a person/location edit, every visit referencing it embeds the
//!   new snapshot.
//! - After a person/location delete, no visit references the deleted id.
//! - Cascade steps cannot fail on consistent state; a failing cascade is a
//!   fatal internal-consistency bug and panics.
//!
//! # See also
//! - `crate::collection` for uniqueness rules.
//! - `crate::storage` for load/save of a whole store.

mod query;

use crate::collection::{CollectionError, CollectionResult, UniqueCollection, VisitCollection};
use crate::model::{EntityId, Location, Person, Visit};
use chrono::NaiveDate;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// User-recoverable store failures. The store is unchanged when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness or lookup failure from one collection.
    Collection(CollectionError),
    /// A visit references a person/location id that is not stored.
    UnknownReference { kind: &'static str, id: EntityId },
    /// Bulk date delete matched no visit.
    NothingToDelete { date: NaiveDate },
}

impl StoreError {
    /// Stable error code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Collection(CollectionError::DuplicateIdentity { .. }) => "duplicate_identity",
            Self::Collection(CollectionError::DuplicateId { .. }) => "duplicate_id",
            Self::Collection(CollectionError::NotFound { .. }) => "not_found",
            Self::UnknownReference { .. } => "unknown_reference",
            Self::NothingToDelete { .. } => "nothing_to_delete",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection(err) => write!(f, "{err}"),
            Self::UnknownReference { kind, id } => {
                write!(f, "no {kind} with identifier `{id}` exists")
            }
            Self::NothingToDelete { date } => {
                write!(f, "no visits on or before {} to delete", crate::model::format_date(*date))
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CollectionError> for StoreError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// Owner of the three entity collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    persons: UniqueCollection<Person>,
    locations: UniqueCollection<Location>,
    visits: VisitCollection,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-loads a store from three record sets.
    ///
    /// Each set is validated all-or-nothing. Visits are re-bound to the
    /// loaded person/location records by identifier.
    ///
    /// # Errors
    /// - Collection uniqueness errors for any set.
    /// - `UnknownReference` when a visit names an id absent from the sets.
    pub fn from_records(
        persons: Vec<Person>,
        locations: Vec<Location>,
        visits: Vec<Visit>,
    ) -> StoreResult<Self> {
        let mut store = Self::new();
        store.persons.replace_all(persons)?;
        store.locations.replace_all(locations)?;

        let mut bound = Vec::with_capacity(visits.len());
        for visit in visits {
            bound.push(store.bind_visit(visit.person_id(), visit.location_id(), visit.date())?);
        }
        store.visits.replace_all(bound)?;

        debug!(
            "event=store_load module=store status=ok persons={} locations={} visits={}",
            store.persons.len(),
            store.locations.len(),
            store.visits.len()
        );
        Ok(store)
    }

    pub fn add_person(&mut self, person: Person) -> StoreResult<()> {
        let result = self.persons.add(person).map_err(StoreError::from);
        log_outcome("person_add", &result);
        result
    }

    pub fn add_location(&mut self, location: Location) -> StoreResult<()> {
        let result = self.locations.add(location).map_err(StoreError::from);
        log_outcome("location_add", &result);
        result
    }

    /// Adds a visit whose person and location are already stored.
    ///
    /// The visit is re-bound to the stored records, so a stale snapshot
    /// passed by the caller is never kept.
    pub fn add_visit(&mut self, visit: Visit) -> StoreResult<()> {
        self.add_visit_by_ids(visit.person_id(), visit.location_id(), visit.date())
            .map(|_| ())
    }

    /// Adds the visit of the stored person and location named by the ids.
    ///
    /// # Errors
    /// - `UnknownReference` when either id is not stored.
    /// - `DuplicateIdentity` when the same visit already exists.
    pub fn add_visit_by_ids(
        &mut self,
        person_id: &EntityId,
        location_id: &EntityId,
        date: NaiveDate,
    ) -> StoreResult<Visit> {
        let result = self.bind_visit(person_id, location_id, date).and_then(|bound| {
            self.visits
                .add(bound.clone())
                .map(|()| bound)
                .map_err(StoreError::from)
        });
        log_outcome("visit_add", &result);
        result
    }

    /// Replaces `old` with `new`, then rewrites every visit of `old`.
    ///
    /// No cascade runs when the replacement is rejected.
    pub fn edit_person(&mut self, old: &Person, new: Person) -> StoreResult<usize> {
        let result = self
            .persons
            .replace(old, new.clone())
            .map_err(StoreError::from)
            .map(|()| {
                expect_cascade(
                    "person_edit",
                    self.visits.rewrite_person_snapshots(old.id(), &new),
                )
            });
        log_cascade("person_edit", "visits_rewritten", &result);
        result
    }

    pub fn edit_location(&mut self, old: &Location, new: Location) -> StoreResult<usize> {
        let result = self
            .locations
            .replace(old, new.clone())
            .map_err(StoreError::from)
            .map(|()| {
                expect_cascade(
                    "location_edit",
                    self.visits.rewrite_location_snapshots(old.id(), &new),
                )
            });
        log_cascade("location_edit", "visits_rewritten", &result);
        result
    }

    /// Removes `person` and every visit referencing its identifier.
    ///
    /// Returns the number of cascaded visit deletions.
    pub fn delete_person(&mut self, person: &Person) -> StoreResult<usize> {
        let result = self
            .persons
            .remove(person)
            .map_err(StoreError::from)
            .map(|removed| self.visits.remove_where_references_person(removed.id()));
        log_cascade("person_delete", "visits_removed", &result);
        result
    }

    pub fn delete_location(&mut self, location: &Location) -> StoreResult<usize> {
        let result = self
            .locations
            .remove(location)
            .map_err(StoreError::from)
            .map(|removed| self.visits.remove_where_references_location(removed.id()));
        log_cascade("location_delete", "visits_removed", &result);
        result
    }

    pub fn delete_visit(&mut self, visit: &Visit) -> StoreResult<()> {
        let result = self
            .visits
            .remove(visit)
            .map(|_| ())
            .map_err(StoreError::from);
        log_outcome("visit_delete", &result);
        result
    }

    /// Deletes every visit dated on or before `date`.
    ///
    /// # Errors
    /// - `NothingToDelete` when no visit matches; the store is unchanged.
    pub fn delete_visits_on_or_before(&mut self, date: NaiveDate) -> StoreResult<usize> {
        let removed = self.visits.remove_on_or_before(date);
        let result = if removed.is_empty() {
            Err(StoreError::NothingToDelete { date })
        } else {
            Ok(removed.len())
        };
        log_cascade("visit_delete_before", "visits_removed", &result);
        result
    }

    pub fn get_person_by_id(&self, id: &EntityId) -> StoreResult<&Person> {
        self.persons.get_by_id(id).map_err(StoreError::from)
    }

    pub fn get_location_by_id(&self, id: &EntityId) -> StoreResult<&Location> {
        self.locations.get_by_id(id).map_err(StoreError::from)
    }

    /// Order-insensitive equality of all three collections.
    ///
    /// Delete followed by re-add of an unreferenced record restores the same
    /// contents, though the record moves to the end of display order.
    pub fn same_contents(&self, other: &Self) -> bool {
        self.persons.same_contents(&other.persons)
            && self.locations.same_contents(&other.locations)
            && self.visits.same_contents(&other.visits)
    }

    pub fn persons(&self) -> &UniqueCollection<Person> {
        &self.persons
    }

    pub fn locations(&self) -> &UniqueCollection<Location> {
        &self.locations
    }

    pub fn visits(&self) -> &VisitCollection {
        &self.visits
    }

    /// Builds a visit from the stored records named by the two ids.
    fn bind_visit(
        &self,
        person_id: &EntityId,
        location_id: &EntityId,
        date: NaiveDate,
    ) -> StoreResult<Visit> {
        let person = self
            .persons
            .get_by_id(person_id)
            .map_err(|_| StoreError::UnknownReference {
                kind: "person",
                id: person_id.clone(),
            })?;
        let location =
            self.locations
                .get_by_id(location_id)
                .map_err(|_| StoreError::UnknownReference {
                    kind: "location",
                    id: location_id.clone(),
                })?;
        Ok(Visit::new(person.clone(), location.clone(), date))
    }
}

fn expect_cascade(event: &str, result: CollectionResult<usize>) -> usize {
    match result {
        Ok(count) => count,
        Err(err) => {
            error!(
                "event={event} module=store status=fatal error_code=cascade_inconsistent error={err}"
            );
            panic!("{event} cascade found inconsistent visit state: {err}");
        }
    }
}

fn log_outcome<T>(event: &str, result: &StoreResult<T>) {
    match result {
        Ok(_) => debug!("event={event} module=store status=ok"),
        Err(err) => warn!(
            "event={event} module=store status=error error_code={}",
            err.code()
        ),
    }
}

fn log_cascade(event: &str, counter: &str, result: &StoreResult<usize>) {
    match result {
        Ok(count) => debug!("event={event} module=store status=ok {counter}={count}"),
        Err(err) => warn!(
            "event={event} module=store status=error error_code={}",
            err.code()
        ),
    }
}
