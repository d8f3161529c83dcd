//! Sample data used when no saved data exists.

use super::record::{LocationRecord, PersonRecord, StoreRecords, VisitRecord};

fn person(
    id: &str,
    name: &str,
    phone: &str,
    email: &str,
    address: &str,
    quarantine: &str,
    infection: &str,
) -> PersonRecord {
    PersonRecord {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        address: address.to_string(),
        quarantine_status: quarantine.to_string(),
        infection_status: infection.to_string(),
    }
}

fn location(id: &str, name: &str, address: &str) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
    }
}

fn visit(person_id: &str, location_id: &str, date: &str) -> VisitRecord {
    VisitRecord {
        person_id: person_id.to_string(),
        location_id: location_id.to_string(),
        date: date.to_string(),
    }
}

pub fn sample_persons() -> Vec<PersonRecord> {
    vec![
        person("S101", "Alex Yeoh", "87438807", "alexyeoh@example.com", "Blk 30 Geylang Street 29, #06-40", "false", "false"),
        person("S102", "Bernice Yu", "99272758", "berniceyu@example.com", "Blk 30 Lorong 3 Serangoon Gardens, #07-18", "2020-10-01", "2020-09-28"),
        person("S103", "Charlotte Oliveiro", "93210283", "charlotte@example.com", "Blk 11 Ang Mo Kio Street 74, #11-04", "true", "false"),
        person("S104", "David Li", "91031282", "lidavid@example.com", "Blk 436 Serangoon Gardens Street 26, #16-43", "false", "false"),
        person("S105", "Irfan Ibrahim", "92492021", "irfan@example.com", "Blk 47 Tampines Street 20, #17-35", "false", "2020-10-03"),
    ]
}

pub fn sample_locations() -> Vec<LocationRecord> {
    vec![
        location("L101", "Vivocity", "1 HarbourFront Walk"),
        location("L102", "Jurong Point", "1 Jurong West Central 2"),
        location("L103", "Changi Airport", "Airport Blvd"),
        location("L104", "Bugis Junction", "200 Victoria St"),
    ]
}

pub fn sample_visits() -> Vec<VisitRecord> {
    vec![
        visit("S101", "L101", "2020-09-20"),
        visit("S102", "L101", "2020-09-20"),
        visit("S102", "L102", "2020-09-22"),
        visit("S103", "L103", "2020-09-25"),
        visit("S104", "L102", "2020-09-22"),
        visit("S105", "L104", "2020-10-01"),
        visit("S101", "L104", "2020-10-01"),
    ]
}

pub fn sample_records() -> StoreRecords {
    StoreRecords {
        persons: sample_persons(),
        locations: sample_locations(),
        visits: sample_visits(),
    }
}
