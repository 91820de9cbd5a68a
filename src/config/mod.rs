//! Parser settings and defaults documents.

pub mod errors;

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::flatten::FlagNaming;
use crate::schema::FieldPath;

use errors::ConfigError;

fn default_program_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_true() -> bool {
    true
}

/// How a parser names its flags and presents itself.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    #[serde(default = "default_program_name")]
    pub program_name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_true")]
    pub dash_underscores: bool,
    #[serde(default = "default_true")]
    pub lowercase: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            program_name: default_program_name(),
            about: None,
            separator: default_separator(),
            dash_underscores: default_true(),
            lowercase: default_true(),
        }
    }
}

impl ParserConfig {
    pub fn naming(&self) -> FlagNaming {
        FlagNaming {
            separator: self.separator.clone(),
            dash_underscores: self.dash_underscores,
            lowercase: self.lowercase,
        }
    }

    /// Reads settings from a TOML, YAML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let document = load_document(path.as_ref())?;
        serde_json::from_value(document).map_err(|e| ConfigError::ParseError {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Loads a document into a JSON value, picking the format from the extension.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::FileError(format!("failed to open {shown}: {e}")))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let parse_error = |reason: String| ConfigError::ParseError {
        path: shown.clone(),
        reason,
    };

    match ext.as_str() {
        "toml" => toml::from_str::<Value>(&text).map_err(|e| parse_error(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str::<Value>(&text).map_err(|e| parse_error(e.to_string())),
        "json" => serde_json::from_str::<Value>(&text).map_err(|e| parse_error(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(shown)),
    }
}

/// The part of a defaults document that belongs under `prefix`.
///
/// Missing tables mean "no defaults"; a non-table value where a table is
/// expected is an error.
pub fn defaults_at<'a>(document: &'a Value, prefix: &FieldPath) -> Result<Option<&'a Value>, ConfigError> {
    let mut current = document;
    for segment in prefix.segments() {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    if current.is_object() {
        Ok(Some(current))
    } else {
        let location = if prefix.is_root() {
            "<root>".to_string()
        } else {
            prefix.to_string()
        };
        Err(ConfigError::NotATable(location))
    }
}
