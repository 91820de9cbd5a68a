use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::declared::{Declare, DeclaredType};

/// Metadata key holding a field's help text.
pub const HELP_KEY: &str = "help";
/// Metadata key holding the tokens that mean "no value" for an optional field.
pub const NONE_KEYWORDS_KEY: &str = "none_keywords";

/// A typed configuration record whose fields become command-line flags.
///
/// The record is rebuilt from parsed values through `serde`, so the
/// definition's field names must match the names `Deserialize` expects.
pub trait Record: DeserializeOwned + 'static {
    fn definition() -> RecordDefinition;
}

/// Named, ordered set of fields.
#[derive(Debug, Clone, Default)]
pub struct RecordDefinition {
    name: String,
    type_params: Vec<String>,
    bindings: IndexMap<String, DeclaredType>,
    fields: Vec<FieldDefinition>,
}

impl RecordDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a generic parameter, bound positionally by
    /// [`DeclaredType::Applied`].
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Binds a generic parameter to a concrete type for every use of this record.
    pub fn bind(mut self, param: impl Into<String>, declared: DeclaredType) -> Self {
        self.bindings.insert(param.into(), declared);
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    pub fn bindings(&self) -> &IndexMap<String, DeclaredType> {
        &self.bindings
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }
}

/// Converts one command-line token into a field value. Collections call
/// it once per element.
#[derive(Clone, Copy)]
pub struct ValueParser(fn(&str) -> Result<Value, String>);

impl ValueParser {
    pub fn new(parse: fn(&str) -> Result<Value, String>) -> Self {
        Self(parse)
    }

    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        (self.0)(raw)
    }
}

impl fmt::Debug for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueParser(..)")
    }
}

impl PartialEq for ValueParser {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.0, other.0)
    }
}

impl Eq for ValueParser {}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    declared_type: DeclaredType,
    default: Option<Value>,
    metadata: IndexMap<String, Value>,
    parser: Option<ValueParser>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            default: None,
            metadata: IndexMap::new(),
            parser: None,
        }
    }

    /// Field declared with the type `T` maps to.
    pub fn of<T: Declare>(name: impl Into<String>) -> Self {
        Self::new(name, T::declared_type())
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(self, text: impl Into<String>) -> Self {
        self.metadata(HELP_KEY, Value::String(text.into()))
    }

    pub fn none_keywords<S: Into<String>>(self, keywords: impl IntoIterator<Item = S>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| Value::String(k.into()))
            .collect();
        self.metadata(NONE_KEYWORDS_KEY, Value::Array(keywords))
    }

    /// Reads this field's tokens with `parse` instead of the rule for its type.
    /// Bool fields keep their own parsing.
    pub fn parser(mut self, parse: fn(&str) -> Result<Value, String>) -> Self {
        self.parser = Some(ValueParser::new(parse));
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn value_parser(&self) -> Option<ValueParser> {
        self.parser
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.metadata.get(HELP_KEY).and_then(Value::as_str)
    }

    pub fn none_keyword_list(&self) -> Option<Vec<String>> {
        let keywords = self.metadata.get(NONE_KEYWORDS_KEY)?.as_array()?;
        Some(
            keywords
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Required fields have no default and do not admit `None`.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.declared_type.is_nullable()
    }
}
