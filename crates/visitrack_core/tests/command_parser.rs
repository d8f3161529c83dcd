use chrono::NaiveDate;
use std::num::NonZeroUsize;
use visitrack_core::command::{LocationChanges, PersonChanges};
use visitrack_core::{
    parse_command, Command, EntityId, EntityTarget, HealthStatus, ParseError, ValidationError,
};

fn id(value: &str) -> EntityId {
    EntityId::new(value).unwrap()
}

fn index(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

#[test]
fn add_person_parses_every_field_in_any_order() {
    let command = parse_command(
        "add_person e/alice@example.com n/Alice Tan id/S1 a/Blk 30 Geylang St p/91234567 i/2020-10-01",
    )
    .unwrap();

    let Command::AddPerson(person) = command else {
        panic!("expected add_person, got {command:?}");
    };
    assert_eq!(person.id(), &id("S1"));
    assert_eq!(person.name(), "Alice Tan");
    assert_eq!(person.address(), "Blk 30 Geylang St");
    assert_eq!(person.quarantine_status(), HealthStatus::Clear);
    assert_eq!(
        person.infection_status(),
        HealthStatus::since(NaiveDate::from_ymd_opt(2020, 10, 1).unwrap())
    );
}

#[test]
fn add_person_reports_missing_and_invalid_fields() {
    assert_eq!(
        parse_command("add_person id/S1 n/Alice p/912 e/a@x.com").unwrap_err(),
        ParseError::MissingField("a/")
    );
    assert!(matches!(
        parse_command("add_person id/S1 n/Alice p/12 e/a@x.com a/Home").unwrap_err(),
        ParseError::Invalid(ValidationError::InvalidPhone(_))
    ));
    assert!(matches!(
        parse_command("add_person id/S1 n/Alice p/123 e/a@x.com a/Home q/maybe").unwrap_err(),
        ParseError::Invalid(ValidationError::InvalidStatus(_))
    ));
    assert_eq!(
        parse_command("add_person id/S1 n/Alice p/123 e/a@x.com a/Home l/L1").unwrap_err(),
        ParseError::UnexpectedPrefix {
            command: "add_person",
            prefix: "l/"
        }
    );
}

#[test]
fn add_visit_uses_person_and_location_ids() {
    assert_eq!(
        parse_command("add_visit p/S1 l/L1 d/2020-09-20").unwrap(),
        Command::AddVisit {
            person_id: id("S1"),
            location_id: id("L1"),
            date: NaiveDate::from_ymd_opt(2020, 9, 20).unwrap(),
        }
    );
    assert!(matches!(
        parse_command("add_visit p/S1 l/L1 d/20-09-2020").unwrap_err(),
        ParseError::Invalid(ValidationError::InvalidDate(_))
    ));
}

#[test]
fn edit_accepts_index_or_id_but_not_both() {
    assert_eq!(
        parse_command("edit_person 2 a/New Address").unwrap(),
        Command::EditPerson {
            target: EntityTarget::Index(index(2)),
            changes: PersonChanges {
                address: Some("New Address".to_string()),
                ..PersonChanges::default()
            },
        }
    );
    assert_eq!(
        parse_command("edit_location id/L1 n/Head Office").unwrap(),
        Command::EditLocation {
            target: EntityTarget::Id(id("L1")),
            changes: LocationChanges {
                name: Some("Head Office".to_string()),
                address: None,
            },
        }
    );
    assert_eq!(
        parse_command("edit_person 1 id/S1 n/Bob").unwrap_err(),
        ParseError::AmbiguousTarget
    );
    assert_eq!(
        parse_command("edit_person n/Bob").unwrap_err(),
        ParseError::MissingTarget
    );
    assert_eq!(
        parse_command("edit_location 1").unwrap_err(),
        ParseError::NoFieldsToEdit
    );
}

#[test]
fn indices_must_be_positive_integers() {
    assert_eq!(
        parse_command("delete_person 0").unwrap_err(),
        ParseError::InvalidIndex("0".to_string())
    );
    assert_eq!(
        parse_command("delete_visit abc").unwrap_err(),
        ParseError::InvalidIndex("abc".to_string())
    );
    assert_eq!(
        parse_command("delete_visit 3").unwrap(),
        Command::DeleteVisit(index(3))
    );
    assert_eq!(
        parse_command("delete_location id/L2").unwrap(),
        Command::DeleteLocation(EntityTarget::Id(id("L2")))
    );
}

#[test]
fn list_and_query_commands() {
    assert_eq!(parse_command("  LIST_PERSONS ").unwrap(), Command::ListPersons);
    assert_eq!(
        parse_command("list_visits now").unwrap_err(),
        ParseError::UnexpectedPreamble("now".to_string())
    );
    assert_eq!(
        parse_command("find_persons alice  bob").unwrap(),
        Command::FindPersons(vec!["alice".to_string(), "bob".to_string()])
    );
    assert_eq!(
        parse_command("find_persons").unwrap_err(),
        ParseError::MissingKeywords
    );
    assert_eq!(
        parse_command("list_high_risk 3").unwrap(),
        Command::ListHighRisk(Some(3))
    );
    assert_eq!(
        parse_command("list_high_risk").unwrap(),
        Command::ListHighRisk(None)
    );
    assert_eq!(
        parse_command("list_high_risk -1").unwrap_err(),
        ParseError::InvalidNumber("-1".to_string())
    );
    assert_eq!(
        parse_command("delete_visits_before d/2020-10-01").unwrap(),
        Command::DeleteVisitsBefore(NaiveDate::from_ymd_opt(2020, 10, 1).unwrap())
    );
    assert_eq!(
        parse_command("generate_persons 1").unwrap(),
        Command::GeneratePersons(EntityTarget::Index(index(1)))
    );
}

#[test]
fn unknown_and_empty_input_are_rejected() {
    assert_eq!(parse_command("   ").unwrap_err(), ParseError::Empty);
    assert_eq!(
        parse_command("frobnicate 1").unwrap_err(),
        ParseError::UnknownCommand("frobnicate".to_string())
    );
}

#[test]
fn only_mutations_are_persisted() {
    assert!(parse_command("delete_visit 1").unwrap().is_mutation());
    assert!(!parse_command("list_infected").unwrap().is_mutation());
    assert_eq!(parse_command("help").unwrap().name(), "help");
}
