use recordargs::{ArgParser, ArgsError, MultiParser, Parser};

#[path = "common/mod.rs"]
mod common;

use common::{Flags, Person, argv};

#[test]
fn unknown_tokens_are_returned_in_order() {
    let parser = Parser::<Person>::new().unwrap();
    let (person, unknown) = parser
        .parse_known_args(argv("--name Ada --bogus --nested-city LA extra"))
        .unwrap();
    assert_eq!(person.name, "Ada");
    assert_eq!(person.nested.city, "LA");
    assert_eq!(unknown, argv("--bogus extra"));
}

#[test]
fn unknown_flag_with_inline_value_is_kept_whole() {
    let parser = Parser::<Flags>::new().unwrap();
    let (flags, unknown) = parser
        .parse_known_args(argv("--other=1 --verbose"))
        .unwrap();
    assert!(flags.verbose);
    assert_eq!(unknown, argv("--other=1"));
}

#[test]
fn nothing_unknown_gives_an_empty_list() {
    let parser = MultiParser::<(Person, Flags)>::new().unwrap();
    let ((person, flags), unknown) = parser
        .parse_known_args(argv("--name Bo --nested-city NY --dry-run false"))
        .unwrap();
    assert_eq!(person.name, "Bo");
    assert!(!flags.dry_run);
    assert!(unknown.is_empty());
}

#[test]
fn value_errors_still_surface() {
    let parser = ArgParser::builder().record::<Person>().build().unwrap();
    let err = parser
        .parse_known_values(argv("--name Ada --nested-city SF --bogus"))
        .unwrap_err();
    assert!(matches!(err, ArgsError::Parse(_)));
}
