//! Plain-text rendering of records for command feedback.

use crate::model::{format_date, Location, Person, Visit};
use std::fmt::Write;

pub(crate) fn person_line(person: &Person) -> String {
    format!(
        "[{}] {} | phone {} | email {} | address {} | quarantined: {} | infected: {}",
        person.id(),
        person.name(),
        person.phone(),
        person.email(),
        person.address(),
        person.quarantine_status(),
        person.infection_status()
    )
}

pub(crate) fn location_line(location: &Location) -> String {
    format!(
        "[{}] {} | address {}",
        location.id(),
        location.name(),
        location.address()
    )
}

pub(crate) fn visit_line(visit: &Visit) -> String {
    format!(
        "{} visited {} on {}",
        visit.person().name(),
        visit.location().name(),
        format_date(visit.date())
    )
}

/// Renders `heading` followed by a 1-based numbered list.
pub(crate) fn numbered<T>(heading: &str, items: &[T], line: impl Fn(&T) -> String) -> String {
    let mut text = format!("{heading} ({} listed)", items.len());
    for (index, item) in items.iter().enumerate() {
        let _ = write!(text, "\n  {}. {}", index + 1, line(item));
    }
    text
}
