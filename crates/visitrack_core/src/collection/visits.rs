//! Visit collection with full-value uniqueness and cascade helpers.
//!
//! # Invariants
//! - No two stored visits are structurally equal.
//! - Cascade helpers match visits by the embedded snapshot's identifier,
//!   never by weak identity.

use super::{CollectionError, CollectionResult};
use crate::model::{EntityId, Location, Person, Visit};
use chrono::NaiveDate;

const KIND: &str = "visit";

/// Insertion-ordered collection of unique visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitCollection {
    visits: Vec<Visit>,
}

impl VisitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, visit: &Visit) -> bool {
        self.visits.contains(visit)
    }

    /// Appends `visit` unless an equal visit is already stored.
    pub fn add(&mut self, visit: Visit) -> CollectionResult<()> {
        if self.contains(&visit) {
            return Err(CollectionError::DuplicateIdentity { kind: KIND });
        }
        self.visits.push(visit);
        Ok(())
    }

    /// Removes the visit equal to `visit`.
    pub fn remove(&mut self, visit: &Visit) -> CollectionResult<Visit> {
        let index = self.position(visit)?;
        Ok(self.visits.remove(index))
    }

    /// Swaps `target` for `replacement`, keeping its position.
    ///
    /// `replacement` is compared against every visit except `target`.
    pub fn replace(&mut self, target: &Visit, replacement: Visit) -> CollectionResult<()> {
        let index = self.position(target)?;
        self.replace_at(index, replacement)
    }

    /// Replaces the whole contents after checking the batch for duplicates.
    pub fn replace_all(&mut self, visits: Vec<Visit>) -> CollectionResult<()> {
        for (index, visit) in visits.iter().enumerate() {
            if visits[..index].contains(visit) {
                return Err(CollectionError::DuplicateIdentity { kind: KIND });
            }
        }
        self.visits = visits;
        Ok(())
    }

    /// Removes every visit whose person snapshot is named `person_id`.
    ///
    /// Returns the number of visits removed; zero matches is not an error.
    pub fn remove_where_references_person(&mut self, person_id: &EntityId) -> usize {
        self.remove_where(|visit| visit.person_id() == person_id)
    }

    /// Removes every visit whose location snapshot is named `location_id`.
    pub fn remove_where_references_location(&mut self, location_id: &EntityId) -> usize {
        self.remove_where(|visit| visit.location_id() == location_id)
    }

    /// Removes every visit dated on or before `date`, returning them in
    /// their previous order.
    pub fn remove_on_or_before(&mut self, date: NaiveDate) -> Vec<Visit> {
        let (removed, kept): (Vec<Visit>, Vec<Visit>) = std::mem::take(&mut self.visits)
            .into_iter()
            .partition(|visit| visit.date() <= date);
        self.visits = kept;
        removed
    }

    /// Re-embeds `edited` in every visit referencing its identifier.
    pub fn rewrite_referenced_person(&mut self, edited: &Person) -> CollectionResult<usize> {
        self.rewrite_person_snapshots(edited.id(), edited)
    }

    /// Re-embeds `edited` in every visit referencing `previous_id`.
    ///
    /// Used when an edit also changed the identifier.
    pub fn rewrite_person_snapshots(
        &mut self,
        previous_id: &EntityId,
        edited: &Person,
    ) -> CollectionResult<usize> {
        self.rewrite_where(
            |visit| visit.person_id() == previous_id,
            |visit| visit.with_person(edited.clone()),
        )
    }

    /// Re-embeds `edited` in every visit referencing its identifier.
    pub fn rewrite_referenced_location(&mut self, edited: &Location) -> CollectionResult<usize> {
        self.rewrite_location_snapshots(edited.id(), edited)
    }

    /// Re-embeds `edited` in every visit referencing `previous_id`.
    pub fn rewrite_location_snapshots(
        &mut self,
        previous_id: &EntityId,
        edited: &Location,
    ) -> CollectionResult<usize> {
        self.rewrite_where(
            |visit| visit.location_id() == previous_id,
            |visit| visit.with_location(edited.clone()),
        )
    }

    /// True when both collections hold the same visits, in any order.
    pub fn same_contents(&self, other: &Self) -> bool {
        self.len() == other.len() && self.visits.iter().all(|visit| other.contains(visit))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Visit> {
        self.visits.iter()
    }

    pub fn as_slice(&self) -> &[Visit] {
        &self.visits
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    fn position(&self, visit: &Visit) -> CollectionResult<usize> {
        self.visits
            .iter()
            .position(|stored| stored == visit)
            .ok_or(CollectionError::NotFound { kind: KIND })
    }

    fn replace_at(&mut self, index: usize, replacement: Visit) -> CollectionResult<()> {
        let duplicate = self
            .visits
            .iter()
            .enumerate()
            .any(|(other, stored)| other != index && *stored == replacement);
        if duplicate {
            return Err(CollectionError::DuplicateIdentity { kind: KIND });
        }
        self.visits[index] = replacement;
        Ok(())
    }

    fn remove_where(&mut self, matches: impl Fn(&Visit) -> bool) -> usize {
        let before = self.visits.len();
        self.visits.retain(|visit| !matches(visit));
        before - self.visits.len()
    }

    /// Swaps matching visits one at a time; each replacement is checked
    /// against all other visits only, so it never collides with itself.
    fn rewrite_where(
        &mut self,
        matches: impl Fn(&Visit) -> bool,
        rewrite: impl Fn(&Visit) -> Visit,
    ) -> CollectionResult<usize> {
        let targets: Vec<usize> = self
            .visits
            .iter()
            .enumerate()
            .filter(|(_, visit)| matches(visit))
            .map(|(index, _)| index)
            .collect();

        for &index in &targets {
            let replacement = rewrite(&self.visits[index]);
            self.replace_at(index, replacement)?;
        }
        Ok(targets.len())
    }
}

impl<'a> IntoIterator for &'a VisitCollection {
    type Item = &'a Visit;
    type IntoIter = std::slice::Iter<'a, Visit>;

    fn into_iter(self) -> Self::IntoIter {
        self.visits.iter()
    }
}
