//! Entity records tracked by the store.
//!
//! # Responsibility
//! - Define the immutable `Person`, `Location` and `Visit` value objects.
//! - Validate user-supplied fields at construction time.
//!
//! # Invariants
//! - Records are never mutated in place; edits build a replacement record.
//! - Every `Person`/`Location` carries a caller-supplied, non-blank `EntityId`.
//! - A `Visit` embeds value-copies (snapshots) of its person and location.
//!
//! # See also
//! - DESIGN.md (weak identity and status decisions)

pub mod id;
pub mod location;
pub mod person;
pub mod status;
pub mod validation;
pub mod visit;

use chrono::NaiveDate;

pub use id::EntityId;
pub use location::Location;
pub use person::Person;
pub use status::HealthStatus;
pub use validation::ValidationError;
pub use visit::Visit;

/// Wire/display format for all calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO `yyyy-MM-dd` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Formats a date as ISO `yyyy-MM-dd`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
