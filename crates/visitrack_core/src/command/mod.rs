//! Textual command layer.
//!
//! # Responsibility
//! - Parse user-facing command lines into typed `Command` requests.
//! - Describe how a command names its target: a 1-based index into the
//!   most recently shown list, or an explicit identifier.
//!
//! # Invariants
//! - Index and identifier targets are mutually exclusive.
//! - Every record built here is fully validated before reaching the store.

mod parser;

use crate::model::{EntityId, HealthStatus, Location, Person, ValidationError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

pub use parser::{parse_command, HELP_TEXT};

/// How a command names an existing person or location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTarget {
    /// 1-based position in the most recently shown list.
    Index(NonZeroUsize),
    /// Explicit identifier.
    Id(EntityId),
}

/// Optional replacement fields for a person edit. The identifier is
/// never changed by an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub quarantine_status: Option<HealthStatus>,
    pub infection_status: Option<HealthStatus>,
}

impl PersonChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the replacement record for `person`.
    pub fn apply(&self, person: &Person) -> Result<Person, ValidationError> {
        let edited = Person::new(
            person.id().clone(),
            self.name.as_deref().unwrap_or(person.name()),
            self.phone.as_deref().unwrap_or(person.phone()),
            self.email.as_deref().unwrap_or(person.email()),
            self.address.as_deref().unwrap_or(person.address()),
        )?;
        Ok(edited
            .with_quarantine_status(
                self.quarantine_status
                    .unwrap_or_else(|| person.quarantine_status()),
            )
            .with_infection_status(
                self.infection_status
                    .unwrap_or_else(|| person.infection_status()),
            ))
    }
}

/// Optional replacement fields for a location edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl LocationChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, location: &Location) -> Result<Location, ValidationError> {
        Location::new(
            location.id().clone(),
            self.name.as_deref().unwrap_or(location.name()),
            self.address.as_deref().unwrap_or(location.address()),
        )
    }
}

/// Parsed, validated command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPerson(Person),
    AddLocation(Location),
    AddVisit {
        person_id: EntityId,
        location_id: EntityId,
        date: NaiveDate,
    },
    EditPerson {
        target: EntityTarget,
        changes: PersonChanges,
    },
    EditLocation {
        target: EntityTarget,
        changes: LocationChanges,
    },
    DeletePerson(EntityTarget),
    DeleteLocation(EntityTarget),
    /// Visits have no identifier, so only index targets apply.
    DeleteVisit(NonZeroUsize),
    DeleteVisitsBefore(NaiveDate),
    ListPersons,
    ListLocations,
    ListVisits,
    FindPersons(Vec<String>),
    ListInfected,
    ListQuarantined,
    ListHighRisk(Option<usize>),
    GenerateLocations(EntityTarget),
    GeneratePersons(EntityTarget),
    Help,
    Exit,
}

impl Command {
    /// Command word, used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddPerson(_) => "add_person",
            Self::AddLocation(_) => "add_location",
            Self::AddVisit { .. } => "add_visit",
            Self::EditPerson { .. } => "edit_person",
            Self::EditLocation { .. } => "edit_location",
            Self::DeletePerson(_) => "delete_person",
            Self::DeleteLocation(_) => "delete_location",
            Self::DeleteVisit(_) => "delete_visit",
            Self::DeleteVisitsBefore(_) => "delete_visits_before",
            Self::ListPersons => "list_persons",
            Self::ListLocations => "list_locations",
            Self::ListVisits => "list_visits",
            Self::FindPersons(_) => "find_persons",
            Self::ListInfected => "list_infected",
            Self::ListQuarantined => "list_quarantined",
            Self::ListHighRisk(_) => "list_high_risk",
            Self::GenerateLocations(_) => "generate_locations",
            Self::GeneratePersons(_) => "generate_persons",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    /// True for commands that may change the store and must be persisted.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddPerson(_)
                | Self::AddLocation(_)
                | Self::AddVisit { .. }
                | Self::EditPerson { .. }
                | Self::EditLocation { .. }
                | Self::DeletePerson(_)
                | Self::DeleteLocation(_)
                | Self::DeleteVisit(_)
                | Self::DeleteVisitsBefore(_)
        )
    }
}

/// Command-line format errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    MissingField(&'static str),
    DuplicatePrefix(&'static str),
    UnexpectedPrefix {
        command: &'static str,
        prefix: &'static str,
    },
    UnexpectedPreamble(String),
    InvalidIndex(String),
    InvalidNumber(String),
    /// Both an index and `id/` were supplied.
    AmbiguousTarget,
    /// Neither an index nor `id/` was supplied.
    MissingTarget,
    NoFieldsToEdit,
    MissingKeywords,
    Invalid(ValidationError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no command given; type `help` for usage"),
            Self::UnknownCommand(word) => {
                write!(f, "unknown command `{word}`; type `help` for usage")
            }
            Self::MissingField(prefix) => write!(f, "missing required field `{prefix}`"),
            Self::DuplicatePrefix(prefix) => write!(f, "field `{prefix}` given more than once"),
            Self::UnexpectedPrefix { command, prefix } => {
                write!(f, "`{command}` does not accept field `{prefix}`")
            }
            Self::UnexpectedPreamble(text) => write!(f, "unexpected argument `{text}`"),
            Self::InvalidIndex(text) => {
                write!(f, "invalid index `{text}`: expected a positive integer")
            }
            Self::InvalidNumber(text) => {
                write!(f, "invalid number `{text}`: expected a positive integer")
            }
            Self::AmbiguousTarget => {
                write!(f, "give either an index or `id/`, not both")
            }
            Self::MissingTarget => write!(f, "give an index or `id/` to choose a record"),
            Self::NoFieldsToEdit => write!(f, "at least one field to edit must be provided"),
            Self::MissingKeywords => write!(f, "at least one keyword must be provided"),
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ParseError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}
