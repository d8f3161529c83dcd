//! Location record.

use super::id::EntityId;
use super::validation::{require_non_blank, ValidationError};

/// Immutable location record. Weak identity is the name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    id: EntityId,
    name: String,
    address: String,
}

impl Location {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: require_non_blank(name, ValidationError::BlankName)?,
            address: require_non_blank(address, ValidationError::BlankAddress)?,
        })
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Weak identity: same name.
    pub fn is_same_location(&self, other: &Location) -> bool {
        self.name == other.name
    }
}
