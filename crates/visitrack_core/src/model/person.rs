//! Person record.
//!
//! # Invariants
//! - `name` and `address` are non-blank; `phone` and `email` are well-formed.
//! - Two people are the "same person" (weak identity) when they share a
//!   name and either a phone number or an email address.

use super::id::EntityId;
use super::status::HealthStatus;
use super::validation::{require_non_blank, validate_email, validate_phone, ValidationError};

/// Immutable person record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Person {
    id: EntityId,
    name: String,
    phone: String,
    email: String,
    address: String,
    quarantine_status: HealthStatus,
    infection_status: HealthStatus,
}

impl Person {
    /// Builds a validated person with both statuses `Clear`.
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: require_non_blank(name, ValidationError::BlankName)?,
            phone: validate_phone(phone)?,
            email: validate_email(email)?,
            address: require_non_blank(address, ValidationError::BlankAddress)?,
            quarantine_status: HealthStatus::Clear,
            infection_status: HealthStatus::Clear,
        })
    }

    /// Returns a copy with a different quarantine status.
    pub fn with_quarantine_status(mut self, status: HealthStatus) -> Self {
        self.quarantine_status = status;
        self
    }

    /// Returns a copy with a different infection status.
    pub fn with_infection_status(mut self, status: HealthStatus) -> Self {
        self.infection_status = status;
        self
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn quarantine_status(&self) -> HealthStatus {
        self.quarantine_status
    }

    pub fn infection_status(&self) -> HealthStatus {
        self.infection_status
    }

    pub fn is_infected(&self) -> bool {
        self.infection_status.is_active()
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantine_status.is_active()
    }

    /// Weak identity: same name and (same phone or same email).
    pub fn is_same_person(&self, other: &Person) -> bool {
        self.name == other.name && (self.phone == other.phone || self.email == other.email)
    }
}
