//! Uniqueness-constrained in-memory collections.
//!
//! # Responsibility
//! - Hold records of one kind in insertion order.
//! - Reject inserts/replacements that would break uniqueness.
//!
//! # Invariants
//! - `UniqueCollection` never holds two records with the same id or two
//!   weakly-identical records.
//! - `VisitCollection` never holds two structurally equal visits.
//! - A failed operation leaves the collection unchanged.
//!
//! # See also
//! - `crate::store` for the cascades built on these collections.

pub mod unique;
pub mod visits;

use crate::model::{EntityId, Location, Person};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub use unique::UniqueCollection;
pub use visits::VisitCollection;

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Uniqueness and lookup failures raised by collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Record is weakly identical to an existing record (or, for visits,
    /// structurally equal to one).
    DuplicateIdentity { kind: &'static str },
    /// Identifier already names another record.
    DuplicateId { kind: &'static str, id: EntityId },
    /// No record matches.
    NotFound { kind: &'static str },
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity { kind } => write!(f, "this {kind} already exists"),
            Self::DuplicateId { kind, id } => {
                write!(f, "{kind} identifier `{id}` is already in use")
            }
            Self::NotFound { kind } => write!(f, "{kind} not found"),
        }
    }
}

impl Error for CollectionError {}

/// Record kinds with an identifier axis and a weak-identity axis.
pub trait UniqueRecord: Clone + PartialEq + Debug {
    /// Lowercase kind label used in errors and log events.
    const KIND: &'static str;

    fn id(&self) -> &EntityId;

    /// Weak identity used for duplicate detection.
    fn is_same_identity(&self, other: &Self) -> bool;
}

impl UniqueRecord for Person {
    const KIND: &'static str = "person";

    fn id(&self) -> &EntityId {
        Person::id(self)
    }

    fn is_same_identity(&self, other: &Self) -> bool {
        self.is_same_person(other)
    }
}

impl UniqueRecord for Location {
    const KIND: &'static str = "location";

    fn id(&self) -> &EntityId {
        Location::id(self)
    }

    fn is_same_identity(&self, other: &Self) -> bool {
        self.is_same_location(other)
    }
}
