use recordargs::schema::{Declare, DeclaredType, SchemaError};
use recordargs::{ArgsError, FieldDefinition, Parser, ParserBuilder, Record, RecordDefinition};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[path = "common/mod.rs"]
mod common;

use common::argv;

#[derive(Debug, PartialEq, Deserialize)]
struct Wrapper<T> {
    value: T,
    items: Vec<T>,
}

impl<T: DeserializeOwned + 'static> Record for Wrapper<T> {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Wrapper")
            .type_param("T")
            .field(FieldDefinition::new("value", DeclaredType::param("T")))
            .field(
                FieldDefinition::new("items", DeclaredType::list(DeclaredType::param("T")))
                    .default_value(serde_json::json!([])),
            )
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct Holder {
    counts: Wrapper<u16>,
    names: Wrapper<String>,
}

impl Record for Holder {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Holder")
            .field(FieldDefinition::new(
                "counts",
                DeclaredType::applied::<Wrapper<u16>>([u16::declared_type()]),
            ))
            .field(FieldDefinition::new(
                "names",
                DeclaredType::applied::<Wrapper<String>>([String::declared_type()]),
            ))
    }
}

#[test]
fn applied_arguments_bind_parameters() {
    let parser = Parser::<Holder>::new().unwrap();
    let holder = parser
        .parse_args(argv(
            "--counts-value 3 --counts-items 1 2 --names-value a --names-items x",
        ))
        .unwrap();
    assert_eq!(
        holder,
        Holder {
            counts: Wrapper {
                value: 3,
                items: vec![1, 2]
            },
            names: Wrapper {
                value: "a".to_string(),
                items: vec!["x".to_string()]
            },
        }
    );

    let err = parser
        .parse_args(argv("--counts-value 70000 --names-value a"))
        .unwrap_err();
    assert!(err.is_user_error());
}

#[test]
fn parameter_without_binding_is_unsupported() {
    let err = Parser::<Wrapper<u16>>::new().unwrap_err();
    match err {
        ArgsError::Schema(SchemaError::UnsupportedType { reason, .. }) => {
            assert_eq!(reason, "unconstrained generic parameter");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct Labelled {
    label: String,
}

impl Record for Labelled {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Labelled")
            .type_param("L")
            .bind("L", DeclaredType::Str)
            .field(FieldDefinition::new("label", DeclaredType::param("L")))
    }
}

#[test]
fn definition_bindings_apply_without_arguments() {
    let parser = Parser::<Labelled>::new().unwrap();
    let labelled = parser.parse_args(argv("--label hi")).unwrap();
    assert_eq!(labelled.label, "hi");
}

#[derive(Debug, PartialEq, Deserialize)]
struct Leaf {
    weight: f32,
}

impl Record for Leaf {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Leaf").field(FieldDefinition::of::<f32>("weight").default_value(1.0))
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct Tree {
    leaf: Leaf,
}

impl Record for Tree {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Tree").field(FieldDefinition::new("leaf", DeclaredType::forward("Leaf")))
    }
}

#[test]
fn forward_reference_resolves_through_registered_records() {
    let builder = ParserBuilder::default().register::<Leaf>();
    let parser = Parser::<Tree>::from_builder(builder).unwrap();
    let tree = parser.parse_args(argv("--leaf-weight 2.5")).unwrap();
    assert_eq!(tree.leaf, Leaf { weight: 2.5 });
}

#[test]
fn unknown_forward_reference_is_unsupported() {
    let err = Parser::<Tree>::new().unwrap_err();
    assert!(matches!(
        err,
        ArgsError::Schema(SchemaError::UnsupportedType { .. })
    ));
}

#[derive(Debug, PartialEq, Deserialize)]
struct Span {
    bounds: (u16, u16),
}

fn span_with(bound: DeclaredType) -> RecordDefinition {
    RecordDefinition::new("Span")
        .type_param("T")
        .bind("T", bound)
        .field(FieldDefinition::new(
            "bounds",
            DeclaredType::tuple([DeclaredType::param("T"), u16::declared_type()]),
        ))
}

impl Record for Span {
    fn definition() -> RecordDefinition {
        span_with(u16::declared_type())
    }
}

#[derive(Debug, Deserialize)]
struct MixedSpan;

impl Record for MixedSpan {
    fn definition() -> RecordDefinition {
        span_with(DeclaredType::Str)
    }
}

#[test]
fn tuple_members_compare_after_binding() {
    let parser = Parser::<Span>::new().unwrap();
    let span = parser.parse_args(argv("--bounds 3 9")).unwrap();
    assert_eq!(span, Span { bounds: (3, 9) });

    let err = Parser::<MixedSpan>::new().unwrap_err();
    match err {
        ArgsError::Schema(SchemaError::UnsupportedType { reason, .. }) => {
            assert!(reason.starts_with("tuples with different member types"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
