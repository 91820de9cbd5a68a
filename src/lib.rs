//! Builds command-line parsers from nested record definitions.
//!
//! Every leaf field of a record tree becomes a long flag named after its
//! dotted path (`nested.city` becomes `--nested-city`). Parsed values are
//! coerced to the declared types and reassembled into the record through
//! `serde`.

pub mod coerce;
pub mod config;
pub mod error;
pub mod flatten;
pub mod parser;
pub mod reconstruct;
pub mod resolve;
pub mod schema;

pub use config::ParserConfig;
pub use error::ArgsError;
pub use flatten::{ArgumentSpec, SpecRole};
pub use parser::{ArgParser, MultiParser, Parser, ParserBuilder, RecordSet};
pub use schema::{Declare, DeclaredType, FieldDefinition, FieldPath, Record, RecordDefinition, RecordRef};
pub use serde_json::Value;
