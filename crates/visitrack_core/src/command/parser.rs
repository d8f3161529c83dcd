//! Prefix-based command line parser.
//!
//! Arguments follow the command word as `prefix/value` pairs; values run
//! until the next recognised prefix, so they may contain spaces. Text
//! before the first prefix is the preamble (used for list indices).

use super::{Command, EntityTarget, LocationChanges, ParseError, PersonChanges};
use crate::model::{parse_date, EntityId, HealthStatus, Location, Person};
use once_cell::sync::Lazy;
use regex::Regex;
use std::num::NonZeroUsize;

const ID: &str = "id/";
const NAME: &str = "n/";
const PHONE: &str = "p/";
const EMAIL: &str = "e/";
const ADDRESS: &str = "a/";
const QUARANTINE: &str = "q/";
const INFECTION: &str = "i/";
const LOCATION: &str = "l/";
const DATE: &str = "d/";

const PREFIXES: [&str; 9] = [
    ID, NAME, PHONE, EMAIL, ADDRESS, QUARANTINE, INFECTION, LOCATION, DATE,
];

/// In `add_visit`, `p/` names the person id rather than a phone number.
const PERSON_REF: &str = PHONE;

static PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(id|n|p|e|a|q|i|l|d)/").expect("valid prefix regex"));

pub const HELP_TEXT: &str = "\
Commands:
  add_person id/ID n/NAME p/PHONE e/EMAIL a/ADDRESS [q/STATUS] [i/STATUS]
  add_location id/ID n/NAME a/ADDRESS
  add_visit p/PERSON_ID l/LOCATION_ID d/yyyy-MM-dd
  edit_person INDEX|id/ID [n/NAME] [p/PHONE] [e/EMAIL] [a/ADDRESS] [q/STATUS] [i/STATUS]
  edit_location INDEX|id/ID [n/NAME] [a/ADDRESS]
  delete_person INDEX|id/ID
  delete_location INDEX|id/ID
  delete_visit INDEX
  delete_visits_before d/yyyy-MM-dd
  list_persons | list_locations | list_visits
  find_persons KEYWORD [MORE_KEYWORDS]...
  list_infected | list_quarantined | list_high_risk [COUNT]
  generate_locations INDEX|id/ID
  generate_persons INDEX|id/ID
  help | exit
STATUS is `false`, `true` or a yyyy-MM-dd start date.";

/// Tokenized arguments of one command line.
#[derive(Debug, Default)]
struct ArgumentMap {
    preamble: String,
    values: Vec<(&'static str, String)>,
}

impl ArgumentMap {
    fn tokenize(args: &str) -> Result<Self, ParseError> {
        let mut marks: Vec<(&'static str, usize, usize)> = Vec::new();
        for captures in PREFIX_RE.captures_iter(args) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let Some(prefix) = PREFIXES
                .iter()
                .find(|prefix| prefix.trim_end_matches('/') == name.as_str())
            else {
                continue;
            };
            marks.push((*prefix, whole.start(), whole.end()));
        }

        let preamble_end = marks.first().map_or(args.len(), |mark| mark.1);
        let mut map = Self {
            preamble: args[..preamble_end].trim().to_string(),
            values: Vec::with_capacity(marks.len()),
        };
        for (index, &(prefix, _, value_start)) in marks.iter().enumerate() {
            let value_end = marks.get(index + 1).map_or(args.len(), |next| next.1);
            if map.values.iter().any(|(seen, _)| *seen == prefix) {
                return Err(ParseError::DuplicatePrefix(prefix));
            }
            map.values
                .push((prefix, args[value_start..value_end].trim().to_string()));
        }
        Ok(map)
    }

    fn ensure_allowed(
        &self,
        command: &'static str,
        allowed: &[&'static str],
    ) -> Result<(), ParseError> {
        match self
            .values
            .iter()
            .find(|(prefix, _)| !allowed.contains(prefix))
        {
            Some(&(prefix, _)) => Err(ParseError::UnexpectedPrefix { command, prefix }),
            None => Ok(()),
        }
    }

    fn ensure_no_preamble(&self) -> Result<(), ParseError> {
        if self.preamble.is_empty() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedPreamble(self.preamble.clone()))
        }
    }

    fn get(&self, prefix: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(seen, _)| *seen == prefix)
            .map(|(_, value)| value.as_str())
    }

    fn require(&self, prefix: &'static str) -> Result<&str, ParseError> {
        self.get(prefix).ok_or(ParseError::MissingField(prefix))
    }

    fn status(&self, prefix: &str) -> Result<Option<HealthStatus>, ParseError> {
        self.get(prefix)
            .map(|value| value.parse::<HealthStatus>().map_err(ParseError::from))
            .transpose()
    }

    /// Index from the preamble or identifier from `id/`, never both.
    fn target(&self) -> Result<EntityTarget, ParseError> {
        match (self.preamble.is_empty(), self.get(ID)) {
            (false, Some(_)) => Err(ParseError::AmbiguousTarget),
            (false, None) => parse_index(&self.preamble).map(EntityTarget::Index),
            (true, Some(id)) => Ok(EntityTarget::Id(EntityId::new(id)?)),
            (true, None) => Err(ParseError::MissingTarget),
        }
    }
}

/// Parses one command line.
///
/// # Errors
/// Returns `ParseError` for unknown commands, malformed or missing fields,
/// and ambiguous targets. Field values are validated here.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    // Leading space lets a prefix directly after the command word match.
    let args = format!(" {rest}");

    match word.to_ascii_lowercase().as_str() {
        "add_person" => parse_add_person(&args),
        "add_location" => parse_add_location(&args),
        "add_visit" => parse_add_visit(&args),
        "edit_person" => parse_edit_person(&args),
        "edit_location" => parse_edit_location(&args),
        "delete_person" => parse_target_only("delete_person", &args).map(Command::DeletePerson),
        "delete_location" => {
            parse_target_only("delete_location", &args).map(Command::DeleteLocation)
        }
        "delete_visit" => parse_delete_visit(&args),
        "delete_visits_before" => parse_delete_visits_before(&args),
        "list_persons" => no_arguments(rest, Command::ListPersons),
        "list_locations" => no_arguments(rest, Command::ListLocations),
        "list_visits" => no_arguments(rest, Command::ListVisits),
        "find_persons" => parse_find_persons(rest),
        "list_infected" => no_arguments(rest, Command::ListInfected),
        "list_quarantined" => no_arguments(rest, Command::ListQuarantined),
        "list_high_risk" => parse_list_high_risk(rest),
        "generate_locations" => {
            parse_target_only("generate_locations", &args).map(Command::GenerateLocations)
        }
        "generate_persons" => {
            parse_target_only("generate_persons", &args).map(Command::GeneratePersons)
        }
        "help" => no_arguments(rest, Command::Help),
        "exit" => no_arguments(rest, Command::Exit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_add_person(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed(
        "add_person",
        &[ID, NAME, PHONE, EMAIL, ADDRESS, QUARANTINE, INFECTION],
    )?;
    map.ensure_no_preamble()?;

    let person = Person::new(
        EntityId::new(map.require(ID)?)?,
        map.require(NAME)?,
        map.require(PHONE)?,
        map.require(EMAIL)?,
        map.require(ADDRESS)?,
    )?
    .with_quarantine_status(map.status(QUARANTINE)?.unwrap_or_default())
    .with_infection_status(map.status(INFECTION)?.unwrap_or_default());
    Ok(Command::AddPerson(person))
}

fn parse_add_location(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed("add_location", &[ID, NAME, ADDRESS])?;
    map.ensure_no_preamble()?;

    let location = Location::new(
        EntityId::new(map.require(ID)?)?,
        map.require(NAME)?,
        map.require(ADDRESS)?,
    )?;
    Ok(Command::AddLocation(location))
}

fn parse_add_visit(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed("add_visit", &[PERSON_REF, LOCATION, DATE])?;
    map.ensure_no_preamble()?;

    Ok(Command::AddVisit {
        person_id: EntityId::new(map.require(PERSON_REF)?)?,
        location_id: EntityId::new(map.require(LOCATION)?)?,
        date: parse_date(map.require(DATE)?)?,
    })
}

fn parse_edit_person(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed(
        "edit_person",
        &[ID, NAME, PHONE, EMAIL, ADDRESS, QUARANTINE, INFECTION],
    )?;
    let target = map.target()?;

    let changes = PersonChanges {
        name: map.get(NAME).map(str::to_string),
        phone: map.get(PHONE).map(str::to_string),
        email: map.get(EMAIL).map(str::to_string),
        address: map.get(ADDRESS).map(str::to_string),
        quarantine_status: map.status(QUARANTINE)?,
        infection_status: map.status(INFECTION)?,
    };
    if changes.is_empty() {
        return Err(ParseError::NoFieldsToEdit);
    }
    Ok(Command::EditPerson { target, changes })
}

fn parse_edit_location(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed("edit_location", &[ID, NAME, ADDRESS])?;
    let target = map.target()?;

    let changes = LocationChanges {
        name: map.get(NAME).map(str::to_string),
        address: map.get(ADDRESS).map(str::to_string),
    };
    if changes.is_empty() {
        return Err(ParseError::NoFieldsToEdit);
    }
    Ok(Command::EditLocation { target, changes })
}

fn parse_target_only(command: &'static str, args: &str) -> Result<EntityTarget, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed(command, &[ID])?;
    map.target()
}

fn parse_delete_visit(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed("delete_visit", &[])?;
    if map.preamble.is_empty() {
        return Err(ParseError::MissingTarget);
    }
    parse_index(&map.preamble).map(Command::DeleteVisit)
}

fn parse_delete_visits_before(args: &str) -> Result<Command, ParseError> {
    let map = ArgumentMap::tokenize(args)?;
    map.ensure_allowed("delete_visits_before", &[DATE])?;
    map.ensure_no_preamble()?;
    Ok(Command::DeleteVisitsBefore(parse_date(map.require(DATE)?)?))
}

fn parse_find_persons(rest: &str) -> Result<Command, ParseError> {
    let keywords: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    if keywords.is_empty() {
        return Err(ParseError::MissingKeywords);
    }
    Ok(Command::FindPersons(keywords))
}

fn parse_list_high_risk(rest: &str) -> Result<Command, ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Command::ListHighRisk(None));
    }
    rest.parse::<NonZeroUsize>()
        .map(|count| Command::ListHighRisk(Some(count.get())))
        .map_err(|_| ParseError::InvalidNumber(rest.to_string()))
}

fn no_arguments(rest: &str, command: Command) -> Result<Command, ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnexpectedPreamble(rest.to_string()))
    }
}

fn parse_index(text: &str) -> Result<NonZeroUsize, ParseError> {
    text.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| ParseError::InvalidIndex(text.trim().to_string()))
}
