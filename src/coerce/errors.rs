use thiserror::Error;

/// Problems with the values a user supplied on the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing required argument {flag}.")]
    MissingArgument { flag: String },

    #[error("Invalid value '{value}' for {flag}: {reason}.")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    /// The flag the error is about.
    pub fn flag(&self) -> &str {
        match self {
            ParseError::MissingArgument { flag } | ParseError::InvalidValue { flag, .. } => flag,
        }
    }
}
