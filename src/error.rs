use thiserror::Error;

use crate::coerce::errors::ParseError;
use crate::config::errors::ConfigError;
use crate::schema::errors::SchemaError;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejected by the tokenizer, including `--help` requests.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("Internal consistency error: {0}.")]
    InternalConsistency(String),

    #[error("Could not build record '{record}' from parsed values: {source}")]
    Instantiate {
        record: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ArgsError {
    /// Whether the error was caused by the command line rather than by the
    /// record definitions or the crate itself.
    pub fn is_user_error(&self) -> bool {
        matches!(self, ArgsError::Parse(_) | ArgsError::Cli(_))
    }
}
