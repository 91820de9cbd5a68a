use recordargs::coerce::ParseError;
use recordargs::{ArgParser, ArgsError, FieldDefinition, Parser, Record, RecordDefinition, Value};
use serde::Deserialize;
use serde_json::json;

#[path = "common/mod.rs"]
mod common;

use common::{Location, Person, argv};

#[derive(Debug, PartialEq, Deserialize)]
struct Trip {
    origin: Location,
    legs: u8,
}

impl Record for Trip {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Trip")
            .field(FieldDefinition::of::<Location>("origin").default_value(json!({ "city": "NY" })))
            .field(FieldDefinition::of::<u8>("legs").default_value(1))
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct Itinerary {
    traveller: Person,
    trip: Trip,
}

impl Record for Itinerary {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Itinerary")
            .field(FieldDefinition::of::<Person>("traveller"))
            .field(FieldDefinition::of::<Trip>("trip"))
    }
}

recordargs::declare_records!(Person, Trip);

#[test]
fn nested_record_is_rebuilt() {
    let parser = Parser::<Person>::new().unwrap();
    let person = parser
        .parse_args(argv("--name Ada --nested-city LA"))
        .unwrap();
    assert_eq!(
        person,
        Person {
            name: "Ada".to_string(),
            nested: Location {
                city: "LA".to_string()
            }
        }
    );
}

#[test]
fn choice_outside_the_set_lists_allowed_values() {
    let parser = Parser::<Person>::new().unwrap();
    let err = parser
        .parse_args(argv("--name Ada --nested-city SF"))
        .unwrap_err();
    match err {
        ArgsError::Parse(ParseError::InvalidValue {
            flag,
            value,
            reason,
        }) => {
            assert_eq!(flag, "--nested-city");
            assert_eq!(value, "SF");
            assert!(reason.contains("LA"));
            assert!(reason.contains("NY"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parent_default_seeds_nested_fields() {
    let parser = Parser::<Trip>::new().unwrap();
    let trip = parser.parse_args(argv("")).unwrap();
    assert_eq!(trip.origin.city, "NY");
    assert_eq!(trip.legs, 1);

    let trip = parser.parse_args(argv("--origin-city LA")).unwrap();
    assert_eq!(trip.origin.city, "LA");
}

#[test]
fn deep_paths_join_every_segment() {
    let parser = ArgParser::builder().record::<Itinerary>().build().unwrap();
    let flags: Vec<&str> = parser.specs().iter().map(|s| s.flag_name.as_str()).collect();
    assert_eq!(
        flags,
        [
            "--traveller-name",
            "--traveller-nested-city",
            "--trip-origin-city",
            "--trip-legs"
        ]
    );

    let values = parser
        .parse_values(argv(
            "--traveller-name Bo --traveller-nested-city NY --trip-legs 3",
        ))
        .unwrap();
    assert_eq!(
        values,
        vec![json!({
            "traveller": { "name": "Bo", "nested": { "city": "NY" } },
            "trip": { "origin": { "city": "NY" }, "legs": 3 }
        })]
    );
}

#[test]
fn rebuilt_objects_keep_declaration_order() {
    let parser = ArgParser::builder().record::<Itinerary>().build().unwrap();
    let values = parser
        .parse_values(argv(
            "--trip-legs 2 --traveller-nested-city LA --traveller-name Cy",
        ))
        .unwrap();
    let Value::Object(root) = &values[0] else {
        panic!("expected an object");
    };
    let keys: Vec<&str> = root.keys().map(String::as_str).collect();
    assert_eq!(keys, ["traveller", "trip"]);
}
