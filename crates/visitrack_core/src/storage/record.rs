//! Flat wire records and store encode/decode.

use super::{StorageError, StorageResult};
use crate::collection::{UniqueCollection, UniqueRecord, VisitCollection};
use crate::model::{
    format_date, parse_date, EntityId, HealthStatus, Location, Person, ValidationError, Visit,
};
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted person fields. Statuses are `false`, `true` or an ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub quarantine_status: String,
    pub infection_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// Persisted visit: identifiers only, snapshots are re-resolved on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub person_id: String,
    pub location_id: String,
    pub date: String,
}

/// The three record sets of one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecords {
    pub persons: Vec<PersonRecord>,
    pub locations: Vec<LocationRecord>,
    pub visits: Vec<VisitRecord>,
}

impl From<&Person> for PersonRecord {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id().to_string(),
            name: person.name().to_string(),
            phone: person.phone().to_string(),
            email: person.email().to_string(),
            address: person.address().to_string(),
            quarantine_status: person.quarantine_status().to_string(),
            infection_status: person.infection_status().to_string(),
        }
    }
}

impl TryFrom<&PersonRecord> for Person {
    type Error = ValidationError;

    fn try_from(record: &PersonRecord) -> Result<Self, Self::Error> {
        let quarantine: HealthStatus = record.quarantine_status.parse()?;
        let infection: HealthStatus = record.infection_status.parse()?;
        Ok(Person::new(
            EntityId::new(record.id.as_str())?,
            record.name.as_str(),
            record.phone.as_str(),
            record.email.as_str(),
            record.address.as_str(),
        )?
        .with_quarantine_status(quarantine)
        .with_infection_status(infection))
    }
}

impl From<&Location> for LocationRecord {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id().to_string(),
            name: location.name().to_string(),
            address: location.address().to_string(),
        }
    }
}

impl TryFrom<&LocationRecord> for Location {
    type Error = ValidationError;

    fn try_from(record: &LocationRecord) -> Result<Self, Self::Error> {
        Location::new(
            EntityId::new(record.id.as_str())?,
            record.name.as_str(),
            record.address.as_str(),
        )
    }
}

impl From<&Visit> for VisitRecord {
    fn from(visit: &Visit) -> Self {
        Self {
            person_id: visit.person_id().to_string(),
            location_id: visit.location_id().to_string(),
            date: format_date(visit.date()),
        }
    }
}

/// Flattens all three collections; visits keep only identifiers.
pub fn encode_store(store: &EntityStore) -> StoreRecords {
    StoreRecords {
        persons: store.persons().iter().map(PersonRecord::from).collect(),
        locations: store.locations().iter().map(LocationRecord::from).collect(),
        visits: store.visits().iter().map(VisitRecord::from).collect(),
    }
}

/// Validates person records field-by-field and as a unique set.
pub fn decode_persons(records: &[PersonRecord]) -> StorageResult<Vec<Person>> {
    let persons = records
        .iter()
        .map(|record| {
            Person::try_from(record).map_err(|err| malformed_field("person", &record.id, err))
        })
        .collect::<StorageResult<Vec<_>>>()?;
    ensure_unique(persons)
}

/// Validates location records field-by-field and as a unique set.
pub fn decode_locations(records: &[LocationRecord]) -> StorageResult<Vec<Location>> {
    let locations = records
        .iter()
        .map(|record| {
            Location::try_from(record).map_err(|err| malformed_field("location", &record.id, err))
        })
        .collect::<StorageResult<Vec<_>>>()?;
    ensure_unique(locations)
}

/// Resolves visit records against already-decoded people and locations.
///
/// # Errors
/// - `MalformedRecord` naming the identifier when a reference cannot be
///   resolved, a date is invalid, or two visits are equal.
pub fn decode_visits(
    records: &[VisitRecord],
    persons: &[Person],
    locations: &[Location],
) -> StorageResult<Vec<Visit>> {
    let persons_by_id: HashMap<&str, &Person> = persons
        .iter()
        .map(|person| (person.id().as_str(), person))
        .collect();
    let locations_by_id: HashMap<&str, &Location> = locations
        .iter()
        .map(|location| (location.id().as_str(), location))
        .collect();

    let mut visits = Vec::with_capacity(records.len());
    for record in records {
        let person = persons_by_id
            .get(record.person_id.trim())
            .ok_or_else(|| unknown_reference("person", &record.person_id))?;
        let location = locations_by_id
            .get(record.location_id.trim())
            .ok_or_else(|| unknown_reference("location", &record.location_id))?;
        let date = parse_date(&record.date).map_err(|err| {
            StorageError::MalformedRecord(format!(
                "visit of person `{}`: {err}",
                record.person_id
            ))
        })?;
        visits.push(Visit::new((*person).clone(), (*location).clone(), date));
    }

    VisitCollection::new()
        .replace_all(visits.clone())
        .map_err(|err| StorageError::MalformedRecord(format!("visits: {err}")))?;
    Ok(visits)
}

/// Rebuilds a whole store from its record sets.
pub fn decode_store(records: &StoreRecords) -> StorageResult<EntityStore> {
    let persons = decode_persons(&records.persons)?;
    let locations = decode_locations(&records.locations)?;
    let visits = decode_visits(&records.visits, &persons, &locations)?;
    EntityStore::from_records(persons, locations, visits)
        .map_err(|err| StorageError::MalformedRecord(err.to_string()))
}

fn ensure_unique<T: UniqueRecord>(records: Vec<T>) -> StorageResult<Vec<T>> {
    UniqueCollection::new()
        .replace_all(records.clone())
        .map_err(|err| StorageError::MalformedRecord(format!("{}s: {err}", T::KIND)))?;
    Ok(records)
}

fn malformed_field(kind: &str, id: &str, err: ValidationError) -> StorageError {
    StorageError::MalformedRecord(format!("{kind} record `{id}`: {err}"))
}

fn unknown_reference(kind: &str, id: &str) -> StorageError {
    StorageError::MalformedRecord(format!("visit references unknown {kind} `{id}`"))
}
