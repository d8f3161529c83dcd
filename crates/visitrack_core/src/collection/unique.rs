//! Collection enforcing id uniqueness and weak-identity uniqueness.

use super::{CollectionError, CollectionResult, UniqueRecord};
use crate::model::EntityId;

/// Insertion-ordered collection with two independent uniqueness axes.
///
/// Both axes are validated by linear scan; insertion order is kept for
/// display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueCollection<T: UniqueRecord> {
    records: Vec<T>,
}

impl<T: UniqueRecord> Default for UniqueCollection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: UniqueRecord> UniqueCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a stored record is weakly identical to `record`.
    pub fn contains(&self, record: &T) -> bool {
        self.records.iter().any(|stored| stored.is_same_identity(record))
    }

    /// True when a stored record has identifier `id`.
    pub fn contains_id(&self, id: &EntityId) -> bool {
        self.records.iter().any(|stored| stored.id() == id)
    }

    /// Returns the record named `id`.
    pub fn get_by_id(&self, id: &EntityId) -> CollectionResult<&T> {
        self.records
            .iter()
            .find(|stored| stored.id() == id)
            .ok_or(CollectionError::NotFound { kind: T::KIND })
    }

    /// Appends `record` after checking both uniqueness axes.
    ///
    /// # Errors
    /// - `DuplicateIdentity` when a weakly-identical record exists.
    /// - `DuplicateId` when the identifier is taken.
    pub fn add(&mut self, record: T) -> CollectionResult<()> {
        if let Some(conflict) = self.find_conflict(&record, None) {
            return Err(conflict);
        }
        self.records.push(record);
        Ok(())
    }

    /// Swaps `target` for `replacement` in place.
    ///
    /// `target` is located by exact structural match. `replacement` is only
    /// checked against the other records, so it may keep the identifier and
    /// weak identity of `target`.
    pub fn replace(&mut self, target: &T, replacement: T) -> CollectionResult<()> {
        let index = self
            .position(target)
            .ok_or(CollectionError::NotFound { kind: T::KIND })?;
        if let Some(conflict) = self.find_conflict(&replacement, Some(index)) {
            return Err(conflict);
        }
        self.records[index] = replacement;
        Ok(())
    }

    /// Removes the record structurally equal to `record`.
    pub fn remove(&mut self, record: &T) -> CollectionResult<T> {
        let index = self
            .position(record)
            .ok_or(CollectionError::NotFound { kind: T::KIND })?;
        Ok(self.records.remove(index))
    }

    /// Replaces the whole contents with `records`.
    ///
    /// The batch is validated pairwise on both axes first; on any violation
    /// the current contents are left untouched.
    pub fn replace_all(&mut self, records: Vec<T>) -> CollectionResult<()> {
        validate_batch(&records)?;
        self.records = records;
        Ok(())
    }

    /// True when both collections hold the same records, in any order.
    ///
    /// `==` also compares insertion order, which only drives display.
    pub fn same_contents(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .records
                .iter()
                .all(|record| other.position(record).is_some())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Weak identity is checked before the identifier, over every record
    /// except the one at `skip`.
    fn find_conflict(&self, candidate: &T, skip: Option<usize>) -> Option<CollectionError> {
        let is_other = |index: usize| Some(index) != skip;
        let same_identity = self
            .records
            .iter()
            .enumerate()
            .any(|(index, stored)| is_other(index) && stored.is_same_identity(candidate));
        if same_identity {
            return Some(CollectionError::DuplicateIdentity { kind: T::KIND });
        }
        let same_id = self
            .records
            .iter()
            .enumerate()
            .any(|(index, stored)| is_other(index) && stored.id() == candidate.id());
        if same_id {
            return Some(duplicate_id::<T>(candidate.id()));
        }
        None
    }

    fn position(&self, record: &T) -> Option<usize> {
        self.records.iter().position(|stored| stored == record)
    }
}

impl<'a, T: UniqueRecord> IntoIterator for &'a UniqueCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn validate_batch<T: UniqueRecord>(records: &[T]) -> CollectionResult<()> {
    for (index, record) in records.iter().enumerate() {
        for earlier in &records[..index] {
            if earlier.is_same_identity(record) {
                return Err(CollectionError::DuplicateIdentity { kind: T::KIND });
            }
            if earlier.id() == record.id() {
                return Err(duplicate_id::<T>(record.id()));
            }
        }
    }
    Ok(())
}

fn duplicate_id<T: UniqueRecord>(id: &EntityId) -> CollectionError {
    CollectionError::DuplicateId {
        kind: T::KIND,
        id: id.clone(),
    }
}
