//! Tracker use-case service.
//!
//! # Responsibility
//! - Turn one command line into one store operation plus feedback text.
//! - Keep the "shown" person/location views that indices refer to.
//!
//! # Invariants
//! - Only successful mutating commands trigger a save.
//! - Visit indices always refer to the date-sorted visit list.

use super::render::{location_line, numbered, person_line, visit_line};
use crate::command::{parse_command, Command, EntityTarget, ParseError, HELP_TEXT};
use crate::model::{format_date, EntityId, Location, Person, ValidationError, Visit};
use crate::storage::{bootstrap_store, DataStorage, StorageError};
use crate::store::{EntityStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::time::Instant;

/// Errors surfaced to the user for a rejected command.
#[derive(Debug)]
pub enum CommandError {
    Parse(ParseError),
    Validation(ValidationError),
    /// Index is past the end of the shown list.
    InvalidIndex {
        kind: &'static str,
        index: usize,
        shown: usize,
    },
    Store(StoreError),
    /// The mutation succeeded but could not be saved.
    Storage(StorageError),
}

impl CommandError {
    fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Validation(_) => "validation",
            Self::InvalidIndex { .. } => "invalid_index",
            Self::Store(err) => err.code(),
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidIndex { kind, index, shown } => write!(
                f,
                "{kind} index {index} is invalid; {shown} {kind}(s) currently shown"
            ),
            Self::Store(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "change applied but could not be saved: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidIndex { .. } => None,
            Self::Store(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ParseError> for CommandError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for CommandError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Feedback for one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub message: String,
    /// Set by `exit`; the caller should stop reading commands.
    pub exit: bool,
}

impl CommandOutcome {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: false,
        }
    }
}

/// Filter behind the shown person list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PersonView {
    #[default]
    All,
    Infected,
    Quarantined,
    Matching(Vec<String>),
    ContactsOf(EntityId),
}

/// Filter behind the shown location list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocationView {
    #[default]
    All,
    VisitedBy(EntityId),
    HighRisk(Option<usize>),
}

/// Single-writer command executor owning the store and its storage.
pub struct TrackerService<S: DataStorage> {
    store: EntityStore,
    storage: S,
    person_view: PersonView,
    location_view: LocationView,
}

impl<S: DataStorage> TrackerService<S> {
    pub fn new(store: EntityStore, storage: S) -> Self {
        Self {
            store,
            storage,
            person_view: PersonView::default(),
            location_view: LocationView::default(),
        }
    }

    /// Loads the store from `storage` with sample/empty fallbacks.
    pub fn bootstrap(storage: S) -> Self {
        let store = bootstrap_store(&storage);
        Self::new(store, storage)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn person_view(&self) -> &PersonView {
        &self.person_view
    }

    pub fn location_view(&self) -> &LocationView {
        &self.location_view
    }

    /// Parses and executes one command line.
    ///
    /// # Errors
    /// - Parse/validation/index/store errors leave the store unchanged.
    /// - `Storage` means the store changed but the save failed.
    pub fn execute(&mut self, input: &str) -> Result<CommandOutcome, CommandError> {
        let started_at = Instant::now();
        let result = parse_command(input)
            .map_err(CommandError::from)
            .and_then(|command| {
                let name = command.name();
                self.run(command).map(|outcome| (name, outcome))
            });

        match result {
            Ok((name, outcome)) => {
                info!(
                    "event=command_execute module=service status=ok command={name} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=command_execute module=service status=error error_code={} duration_ms={}",
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// People in the current person view, in display order.
    pub fn shown_persons(&self) -> Vec<&Person> {
        match &self.person_view {
            PersonView::All => self.store.persons().iter().collect(),
            PersonView::Infected => self.store.infected_persons(),
            PersonView::Quarantined => self.store.quarantined_persons(),
            PersonView::Matching(keywords) => self.store.find_persons(keywords.as_slice()),
            PersonView::ContactsOf(id) => self
                .store
                .persons_in_contact_with(id)
                .unwrap_or_default(),
        }
    }

    /// Locations in the current location view, in display order.
    pub fn shown_locations(&self) -> Vec<&Location> {
        match &self.location_view {
            LocationView::All => self.store.locations().iter().collect(),
            LocationView::VisitedBy(id) => {
                self.store.locations_visited_by(id).unwrap_or_default()
            }
            LocationView::HighRisk(limit) => self
                .store
                .high_risk_locations(*limit)
                .into_iter()
                .map(|(location, _)| location)
                .collect(),
        }
    }

    /// Visits sorted by date; visit indices refer to this list.
    pub fn shown_visits(&self) -> Vec<&Visit> {
        self.store.visits_by_date()
    }

    fn run(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        let persist = command.is_mutation();
        let outcome = self.apply(command)?;
        if persist {
            self.storage.save(&self.store)?;
        }
        Ok(outcome)
    }

    fn apply(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        let outcome = match command {
            Command::AddPerson(person) => {
                let line = person_line(&person);
                self.store.add_person(person)?;
                CommandOutcome::message(format!("New person added: {line}"))
            }
            Command::AddLocation(location) => {
                let line = location_line(&location);
                self.store.add_location(location)?;
                CommandOutcome::message(format!("New location added: {line}"))
            }
            Command::AddVisit {
                person_id,
                location_id,
                date,
            } => {
                let visit = self
                    .store
                    .add_visit_by_ids(&person_id, &location_id, date)?;
                CommandOutcome::message(format!("New visit added: {}", visit_line(&visit)))
            }
            Command::EditPerson { target, changes } => {
                let old = self.resolve_person(&target)?;
                let edited = changes.apply(&old)?;
                let line = person_line(&edited);
                let rewritten = self.store.edit_person(&old, edited)?;
                CommandOutcome::message(format!(
                    "Edited person: {line} ({rewritten} visit(s) updated)"
                ))
            }
            Command::EditLocation { target, changes } => {
                let old = self.resolve_location(&target)?;
                let edited = changes.apply(&old)?;
                let line = location_line(&edited);
                let rewritten = self.store.edit_location(&old, edited)?;
                CommandOutcome::message(format!(
                    "Edited location: {line} ({rewritten} visit(s) updated)"
                ))
            }
            Command::DeletePerson(target) => {
                let person = self.resolve_person(&target)?;
                let removed = self.store.delete_person(&person)?;
                CommandOutcome::message(format!(
                    "Deleted person: {} ({removed} visit(s) removed)",
                    person_line(&person)
                ))
            }
            Command::DeleteLocation(target) => {
                let location = self.resolve_location(&target)?;
                let removed = self.store.delete_location(&location)?;
                CommandOutcome::message(format!(
                    "Deleted location: {} ({removed} visit(s) removed)",
                    location_line(&location)
                ))
            }
            Command::DeleteVisit(index) => {
                let visit = self.resolve_visit(index)?;
                self.store.delete_visit(&visit)?;
                CommandOutcome::message(format!("Deleted visit: {}", visit_line(&visit)))
            }
            Command::DeleteVisitsBefore(date) => {
                let removed = self.store.delete_visits_on_or_before(date)?;
                CommandOutcome::message(format!(
                    "Deleted {removed} visit(s) on or before {}",
                    format_date(date)
                ))
            }
            Command::ListPersons => self.show_persons(PersonView::All, "Persons"),
            Command::ListLocations => self.show_locations(LocationView::All, "Locations"),
            Command::ListVisits => {
                let visits = self.shown_visits();
                CommandOutcome::message(numbered("Visits", &visits, |visit| visit_line(visit)))
            }
            Command::FindPersons(keywords) => {
                self.show_persons(PersonView::Matching(keywords), "Matching persons")
            }
            Command::ListInfected => self.show_persons(PersonView::Infected, "Infected persons"),
            Command::ListQuarantined => {
                self.show_persons(PersonView::Quarantined, "Quarantined persons")
            }
            Command::ListHighRisk(limit) => {
                self.location_view = LocationView::HighRisk(limit);
                let ranked = self.store.high_risk_locations(limit);
                CommandOutcome::message(numbered("High-risk locations", &ranked, |entry| {
                    format!("{} | infected visits: {}", location_line(entry.0), entry.1)
                }))
            }
            Command::GenerateLocations(target) => {
                let person = self.resolve_person(&target)?;
                self.show_locations(
                    LocationView::VisitedBy(person.id().clone()),
                    &format!("Locations visited by {}", person.name()),
                )
            }
            Command::GeneratePersons(target) => {
                let person = self.resolve_person(&target)?;
                self.show_persons(
                    PersonView::ContactsOf(person.id().clone()),
                    &format!("Persons in contact with {}", person.name()),
                )
            }
            Command::Help => CommandOutcome::message(HELP_TEXT),
            Command::Exit => CommandOutcome {
                message: "Goodbye.".to_string(),
                exit: true,
            },
        };
        Ok(outcome)
    }

    fn show_persons(&mut self, view: PersonView, heading: &str) -> CommandOutcome {
        self.person_view = view;
        let persons = self.shown_persons();
        CommandOutcome::message(numbered(heading, &persons, |person| person_line(person)))
    }

    fn show_locations(&mut self, view: LocationView, heading: &str) -> CommandOutcome {
        self.location_view = view;
        let locations = self.shown_locations();
        CommandOutcome::message(numbered(heading, &locations, |location| {
            location_line(location)
        }))
    }

    fn resolve_person(&self, target: &EntityTarget) -> Result<Person, CommandError> {
        match target {
            EntityTarget::Index(index) => {
                let shown = self.shown_persons();
                pick(&shown, *index, "person").map(|person| (*person).clone())
            }
            EntityTarget::Id(id) => Ok(self.store.get_person_by_id(id)?.clone()),
        }
    }

    fn resolve_location(&self, target: &EntityTarget) -> Result<Location, CommandError> {
        match target {
            EntityTarget::Index(index) => {
                let shown = self.shown_locations();
                pick(&shown, *index, "location").map(|location| (*location).clone())
            }
            EntityTarget::Id(id) => Ok(self.store.get_location_by_id(id)?.clone()),
        }
    }

    fn resolve_visit(&self, index: NonZeroUsize) -> Result<Visit, CommandError> {
        let shown = self.shown_visits();
        pick(&shown, index, "visit").map(|visit| (*visit).clone())
    }
}

fn pick<'a, T>(
    shown: &'a [T],
    index: NonZeroUsize,
    kind: &'static str,
) -> Result<&'a T, CommandError> {
    shown
        .get(index.get() - 1)
        .ok_or(CommandError::InvalidIndex {
            kind,
            index: index.get(),
            shown: shown.len(),
        })
}
