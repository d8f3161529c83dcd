//! Caller-supplied identifiers for people and locations.

use super::validation::{require_non_blank, ValidationError};
use std::fmt::{Display, Formatter};

/// Opaque, non-blank identifier naming one `Person` or `Location` within
/// its own collection.
///
/// Identifiers are never generated by the store; callers choose them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(String);

impl EntityId {
    /// Builds an identifier from trimmed, non-blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        require_non_blank(value, ValidationError::BlankId).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EntityId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
