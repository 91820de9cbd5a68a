use recordargs::coerce::{ParsedValues, ValueSource};
use recordargs::reconstruct::reconstruct;
use recordargs::resolve::{ResolvedRecord, Resolver, TypeRegistry};
use recordargs::{ArgsError, FieldDefinition, FieldPath, Parser, Record, RecordDefinition, RecordRef};
use serde::Deserialize;
use serde_json::json;

#[path = "common/mod.rs"]
mod common;

use common::{Person, Service, argv};

fn resolve<T: Record>() -> ResolvedRecord {
    let record = RecordRef::of::<T>();
    let mut registry = TypeRegistry::new();
    registry.collect(record);
    Resolver::new(&registry).resolve_root(record).unwrap()
}

#[test]
fn missing_leaf_value_is_an_internal_error() {
    let err = reconstruct(&resolve::<Person>(), &ParsedValues::new(), &FieldPath::root()).unwrap_err();
    assert!(!err.is_user_error());
    match err {
        ArgsError::InternalConsistency(message) => {
            assert_eq!(message, "no parsed value for 'name'");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_marker_value_is_an_internal_error() {
    let mut parsed = ParsedValues::new();
    parsed.insert(FieldPath::from("name"), json!("svc"), ValueSource::Default);
    let err = reconstruct(&resolve::<Service>(), &parsed, &FieldPath::root()).unwrap_err();
    assert!(matches!(
        err,
        ArgsError::InternalConsistency(ref message) if message == "no marker value for optional record 'db'"
    ));
}

#[test]
fn rebuilt_object_follows_declaration_order() {
    let mut parsed = ParsedValues::new();
    parsed.insert(FieldPath::from("job.nested.city"), json!("LA"), ValueSource::CommandLine);
    parsed.insert(FieldPath::from("job.name"), json!("Ada"), ValueSource::Default);
    let value = reconstruct(&resolve::<Person>(), &parsed, &FieldPath::from("job")).unwrap();
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"name":"Ada","nested":{"city":"LA"}}"#
    );
}

/// Its definition names a field the struct does not have.
#[derive(Debug, Deserialize)]
struct Renamed {
    #[allow(dead_code)]
    total: u8,
}

impl Record for Renamed {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Renamed").field(FieldDefinition::of::<u8>("count"))
    }
}

#[test]
fn definition_out_of_step_with_the_struct_fails_to_instantiate() {
    let parser = Parser::<Renamed>::new().unwrap();
    let err = parser.parse_args(argv("--count 3")).unwrap_err();
    assert!(!err.is_user_error());
    match err {
        ArgsError::Instantiate { record, source } => {
            assert_eq!(record, "Renamed");
            assert!(source.to_string().contains("total"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
