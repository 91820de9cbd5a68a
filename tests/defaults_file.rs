use std::fs;

use recordargs::config::errors::ConfigError;
use recordargs::config::{ParserConfig, load_document};
use recordargs::{ArgsError, MultiParser, Parser, ParserBuilder};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::{Flags, Person, Service, argv};

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write defaults file");
    path
}

#[test]
fn defaults_load_from_every_format() {
    let dir = TempDir::new().unwrap();
    let files = [
        write(
            &dir,
            "defaults.toml",
            "name = \"Toml\"\n\n[nested]\ncity = \"NY\"\n",
        ),
        write(&dir, "defaults.yaml", "name: Yaml\nnested:\n  city: NY\n"),
        write(
            &dir,
            "defaults.json",
            r#"{ "name": "Json", "nested": { "city": "NY" } }"#,
        ),
    ];

    for (file, expected) in files.iter().zip(["Toml", "Yaml", "Json"]) {
        let builder = ParserBuilder::default().defaults_file(file).unwrap();
        let parser = Parser::<Person>::from_builder(builder).unwrap();

        let person = parser.parse_args(argv("")).unwrap();
        assert_eq!(person.name, expected);
        assert_eq!(person.nested.city, "NY");

        let person = parser.parse_args(argv("--nested-city LA")).unwrap();
        assert_eq!(person.nested.city, "LA");
    }
}

#[test]
fn defaults_follow_namespaces() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "defaults.toml",
        "[left]\nname = \"L\"\n[left.nested]\ncity = \"LA\"\n\n[flags]\nverbose = true\n",
    );

    let builder = ParserBuilder::default()
        .defaults_file(&file)
        .unwrap()
        .record_in::<Person>("left")
        .record_in::<Flags>("flags");
    let parser = MultiParser::<(Person, Flags)>::from_builder(builder).unwrap();

    let (person, flags) = parser.parse_args(argv("")).unwrap();
    assert_eq!(person.name, "L");
    assert_eq!(person.nested.city, "LA");
    assert!(flags.verbose);
    assert!(flags.dry_run);
}

#[test]
fn defaults_can_switch_on_an_optional_record() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "defaults.yaml", "db:\n  port: 6543\n");

    let builder = ParserBuilder::default().defaults_file(&file).unwrap();
    let parser = Parser::<Service>::from_builder(builder).unwrap();

    let service = parser.parse_args(argv("")).unwrap();
    let db = service.db.expect("database from defaults");
    assert_eq!(db.port, 6543);
    assert_eq!(db.host, "localhost");

    let service = parser.parse_args(argv("--db none")).unwrap();
    assert_eq!(service.db, None);
}

#[test]
fn unreadable_or_unknown_files_are_config_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        ParserBuilder::default().defaults_file(&missing),
        Err(ConfigError::FileError(_))
    ));

    let ini = write(&dir, "defaults.ini", "name=x");
    assert!(matches!(
        load_document(&ini),
        Err(ConfigError::UnsupportedFormat(_))
    ));

    let broken = write(&dir, "defaults.json", "{ not json");
    assert!(matches!(
        load_document(&broken),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn scalar_where_a_table_belongs_is_rejected() {
    let builder = ParserBuilder::default()
        .defaults(serde_json::json!({ "left": 3 }))
        .record_in::<Flags>("left");
    let err = Parser::<Flags>::from_builder(builder).unwrap_err();
    assert!(matches!(err, ArgsError::Config(ConfigError::NotATable(_))));

    let err = ParserBuilder::default()
        .defaults(serde_json::json!(3))
        .record::<Flags>()
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "Defaults for '<root>' must be a table.");
}

#[test]
fn parser_config_loads_with_defaults_for_missing_keys() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "parser.toml", "program_name = \"tool\"\nseparator = \"_\"\n");

    let config = ParserConfig::load(&file).unwrap();
    assert_eq!(config.program_name, "tool");
    assert_eq!(config.separator, "_");
    assert!(config.dash_underscores);
    assert!(config.lowercase);
    assert_eq!(config.about, None);

    let bad = write(&dir, "bad.toml", "colour = \"red\"\n");
    assert!(matches!(
        ParserConfig::load(&bad),
        Err(ConfigError::ParseError { .. })
    ));
}
