use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File error: {0}.")]
    FileError(String),

    #[error("Failed to parse {path}: {reason}.")]
    ParseError { path: String, reason: String },

    #[error("Unsupported file format: {0}.")]
    UnsupportedFormat(String),

    #[error("Defaults for '{0}' must be a table.")]
    NotATable(String),
}
