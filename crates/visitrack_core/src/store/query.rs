//! Read-only filtered and sorted views over the store.

use super::{EntityStore, StoreResult};
use crate::model::{EntityId, Location, Person, Visit};
use chrono::NaiveDate;
use std::collections::HashSet;

impl EntityStore {
    /// All visits sorted ascending by date; same-day visits keep
    /// insertion order.
    pub fn visits_by_date(&self) -> Vec<&Visit> {
        let mut visits: Vec<&Visit> = self.visits.iter().collect();
        visits.sort_by_key(|visit| visit.date());
        visits
    }

    /// People whose name contains any keyword as a whole word,
    /// case-insensitively.
    pub fn find_persons<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<&Person> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        self.persons
            .iter()
            .filter(|person| {
                person
                    .name()
                    .split_whitespace()
                    .any(|word| keywords.contains(&word.to_lowercase()))
            })
            .collect()
    }

    pub fn infected_persons(&self) -> Vec<&Person> {
        self.persons
            .iter()
            .filter(|person| person.is_infected())
            .collect()
    }

    pub fn quarantined_persons(&self) -> Vec<&Person> {
        self.persons
            .iter()
            .filter(|person| person.is_quarantined())
            .collect()
    }

    /// Distinct locations visited by `person_id`, in first-visit order.
    pub fn locations_visited_by(&self, person_id: &EntityId) -> StoreResult<Vec<&Location>> {
        self.get_person_by_id(person_id)?;
        let mut seen = HashSet::new();
        let mut locations = Vec::new();
        for visit in self.visits.iter().filter(|visit| visit.person_id() == person_id) {
            if seen.insert(visit.location_id()) {
                locations.push(self.get_location_by_id(visit.location_id())?);
            }
        }
        Ok(locations)
    }

    /// Other people who visited a location on the same day as `person_id`.
    pub fn persons_in_contact_with(&self, person_id: &EntityId) -> StoreResult<Vec<&Person>> {
        self.get_person_by_id(person_id)?;
        let exposures: HashSet<(&EntityId, NaiveDate)> = self
            .visits
            .iter()
            .filter(|visit| visit.person_id() == person_id)
            .map(|visit| (visit.location_id(), visit.date()))
            .collect();

        let contacts: HashSet<&EntityId> = self
            .visits
            .iter()
            .filter(|visit| visit.person_id() != person_id)
            .filter(|visit| exposures.contains(&(visit.location_id(), visit.date())))
            .map(|visit| visit.person_id())
            .collect();

        Ok(self
            .persons
            .iter()
            .filter(|person| contacts.contains(person.id()))
            .collect())
    }

    /// Locations ranked by number of visits from currently infected people.
    ///
    /// Locations without such visits are omitted; ties keep insertion order.
    pub fn high_risk_locations(&self, limit: Option<usize>) -> Vec<(&Location, usize)> {
        let mut ranked: Vec<(&Location, usize)> = self
            .locations
            .iter()
            .map(|location| {
                let infected_visits = self
                    .visits
                    .iter()
                    .filter(|visit| visit.location_id() == location.id())
                    .filter(|visit| visit.person().is_infected())
                    .count();
                (location, infected_visits)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        ranked
    }
}
