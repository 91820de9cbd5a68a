//! Caller-facing description of records: what the parser is built from.

mod declared;
pub mod errors;
mod path;
mod record;

pub use declared::{Declare, DeclaredType, RecordRef};
pub use errors::SchemaError;
pub use path::FieldPath;
pub use record::{
    FieldDefinition, HELP_KEY, NONE_KEYWORDS_KEY, Record, RecordDefinition, ValueParser,
};
