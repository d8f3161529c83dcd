//! Visit record: a person at a location on a date.
//!
//! # Invariants
//! - `person` and `location` are snapshots, not live references; the store
//!   rewrites them when the referenced record is edited.
//! - Equality is full structural equality over the whole triple.

use super::location::Location;
use super::person::Person;
use super::EntityId;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Visit {
    person: Person,
    location: Location,
    date: NaiveDate,
}

impl Visit {
    pub fn new(person: Person, location: Location, date: NaiveDate) -> Self {
        Self {
            person,
            location,
            date,
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn person_id(&self) -> &EntityId {
        self.person.id()
    }

    pub fn location_id(&self) -> &EntityId {
        self.location.id()
    }

    /// Returns an otherwise-identical visit carrying a new person snapshot.
    pub fn with_person(&self, person: Person) -> Self {
        Self {
            person,
            location: self.location.clone(),
            date: self.date,
        }
    }

    /// Returns an otherwise-identical visit carrying a new location snapshot.
    pub fn with_location(&self, location: Location) -> Self {
        Self {
            person: self.person.clone(),
            location,
            date: self.date,
        }
    }
}
