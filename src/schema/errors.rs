use thiserror::Error;

use super::FieldPath;

/// Problems with a record schema. These are raised while a parser is being
/// built and never deferred to parse time.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Type {declared} of field '{path}' is not supported: {reason}.")]
    UnsupportedType {
        path: FieldPath,
        declared: String,
        reason: String,
    },

    #[error("Record '{record}' nests itself at '{path}' ({cycle}).")]
    RecursiveSchema {
        path: FieldPath,
        record: String,
        cycle: String,
    },

    #[error("Default for '{path}' is invalid: {reason}.")]
    InvalidDefault { path: FieldPath, reason: String },

    #[error("Duplicate argument {flag}: produced by both '{first}' and '{second}'.")]
    DuplicateArgument {
        flag: String,
        first: FieldPath,
        second: FieldPath,
    },

    #[error("Argument {flag} for field '{path}' clashes with a built-in flag.")]
    ReservedFlag { flag: String, path: FieldPath },

    #[error("Expected between 1 and {max} records, got {count}.")]
    RecordCount { count: usize, max: usize },

    #[error("Parser records do not match: expected [{expected}], found [{found}].")]
    RecordMismatch { expected: String, found: String },
}
