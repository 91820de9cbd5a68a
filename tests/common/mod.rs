#![allow(dead_code)]

use recordargs::schema::DeclaredType;
use recordargs::{FieldDefinition, Record, RecordDefinition};
use serde::{Deserialize, Serialize};

pub fn argv(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
}

impl Record for Location {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Location").field(FieldDefinition::new(
            "city",
            DeclaredType::literal(["LA", "NY"]),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub nested: Location,
}

impl Record for Person {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Person")
            .field(FieldDefinition::of::<String>("name").help("Full name"))
            .field(FieldDefinition::of::<Location>("nested"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    pub verbose: bool,
    pub dry_run: bool,
}

impl Record for Flags {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Flags")
            .field(FieldDefinition::of::<bool>("verbose"))
            .field(FieldDefinition::of::<bool>("dry_run").default_value(true))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Numbers {
    pub small: u8,
    pub offset: i32,
    pub ratio: f64,
    pub level: u8,
}

impl Record for Numbers {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Numbers")
            .field(FieldDefinition::of::<u8>("small").default_value(1))
            .field(FieldDefinition::of::<i32>("offset").default_value(0))
            .field(FieldDefinition::of::<f64>("ratio").default_value(0.5))
            .field(FieldDefinition::new("level", DeclaredType::literal([1, 2, 3])).default_value(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub host: String,
    pub port: u16,
}

impl Record for Database {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Database")
            .field(FieldDefinition::of::<String>("host").default_value("localhost"))
            .field(FieldDefinition::of::<u16>("port"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    pub size: u32,
}

impl Record for Cache {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Cache").field(FieldDefinition::of::<u32>("size"))
    }
}

recordargs::declare_records!(Location, Database, Cache);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub db: Option<Database>,
    pub cache: Option<Cache>,
}

impl Record for Service {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Service")
            .field(FieldDefinition::of::<String>("name").default_value("app"))
            .field(FieldDefinition::of::<Option<Database>>("db"))
            .field(
                FieldDefinition::of::<Option<Cache>>("cache")
                    .default_value(serde_json::json!({ "size": 10 })),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optionals {
    pub nickname: Option<String>,
    pub label: Option<String>,
    pub limit: Option<u32>,
    pub mode: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Record for Optionals {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("Optionals")
            .field(FieldDefinition::of::<Option<String>>("nickname"))
            .field(FieldDefinition::of::<Option<String>>("label").default_value("x"))
            .field(FieldDefinition::of::<Option<u32>>("limit"))
            .field(FieldDefinition::of::<Option<String>>("mode").none_keywords(["off"]))
            .field(FieldDefinition::of::<Option<Vec<String>>>("tags"))
    }
}
