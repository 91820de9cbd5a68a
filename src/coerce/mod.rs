//! Converts raw command-line tokens into typed values.

pub mod errors;
mod scalar;

use indexmap::IndexMap;
use serde_json::Value;

use crate::flatten::{ArgumentSpec, SpecRole};
use crate::resolve::{Arity, TypeExpr};
use crate::schema::FieldPath;

pub use errors::ParseError;
pub use scalar::{check_scalar, match_choice, parse_bool, parse_float, parse_int, parse_scalar};

/// What the tokenizer collected for one flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Single(String),
    Many(Vec<String>),
}

impl RawValue {
    fn tokens(&self) -> Vec<&str> {
        match self {
            RawValue::Single(s) => vec![s.as_str()],
            RawValue::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    fn single(&self) -> Option<&str> {
        match self {
            RawValue::Single(s) => Some(s.as_str()),
            RawValue::Many(items) if items.len() == 1 => Some(items[0].as_str()),
            RawValue::Many(_) => None,
        }
    }

    fn display(&self) -> String {
        self.tokens().join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    CommandLine,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    pub source: ValueSource,
}

/// Coerced values keyed by dotted path, in spec order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedValues {
    values: IndexMap<FieldPath, Parsed>,
}

impl ParsedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: FieldPath, value: Value, source: ValueSource) {
        self.values.insert(path, Parsed { value, source });
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Parsed> {
        self.values.get(path)
    }

    /// Whether any value strictly below `prefix` came from the command line.
    pub fn any_explicit_under(&self, prefix: &FieldPath) -> bool {
        self.values
            .iter()
            .any(|(path, parsed)| parsed.source == ValueSource::CommandLine && path.is_strictly_under(prefix))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Parsed)> {
        self.values.iter()
    }
}

/// Coerces one flag. `raw` is `None` when the flag was not given.
pub fn coerce(raw: Option<&RawValue>, spec: &ArgumentSpec) -> Result<Value, ParseError> {
    let Some(raw) = raw else {
        if spec.required {
            return Err(ParseError::MissingArgument {
                flag: spec.flag_name.clone(),
            });
        }
        return Ok(spec.default.clone().unwrap_or(Value::Null));
    };

    if spec.role == SpecRole::NullMarker {
        let TypeExpr::Choice(allowed) = &spec.type_expr else {
            return Err(invalid(spec, raw, "expected `none`".to_string()));
        };
        let token = raw
            .single()
            .ok_or_else(|| invalid(spec, raw, "expected a single value".to_string()))?;
        match_choice(token, allowed).map_err(|reason| invalid(spec, raw, reason))?;
        return Ok(Value::Null);
    }

    match &spec.type_expr {
        TypeExpr::Optional(inner) => {
            let is_keyword = raw
                .single()
                .is_some_and(|token| spec.none_keywords.iter().any(|k| k == token));
            if is_keyword && !inner.is_collection() {
                Ok(Value::Null)
            } else {
                coerce_present(inner, raw, spec)
            }
        }
        other => coerce_present(other, raw, spec),
    }
}

fn coerce_present(expr: &TypeExpr, raw: &RawValue, spec: &ArgumentSpec) -> Result<Value, ParseError> {
    match expr {
        TypeExpr::Scalar(_) | TypeExpr::Choice(_) | TypeExpr::Custom { .. } => {
            let token = raw
                .single()
                .ok_or_else(|| invalid(spec, raw, "expected a single value".to_string()))?;
            coerce_token(expr, token).map_err(|reason| invalid(spec, raw, reason))
        }
        TypeExpr::Collection { element, arity } => {
            let tokens = raw.tokens();
            if tokens.is_empty() && spec.required {
                return Err(ParseError::MissingArgument {
                    flag: spec.flag_name.clone(),
                });
            }
            if let Arity::Tuple(n) = arity {
                if tokens.len() != *n {
                    return Err(invalid(
                        spec,
                        raw,
                        format!("expected exactly {n} values, got {}", tokens.len()),
                    ));
                }
            }

            let mut items = Vec::with_capacity(tokens.len());
            for token in tokens {
                let item = coerce_token(element, token).map_err(|reason| {
                    ParseError::InvalidValue {
                        flag: spec.flag_name.clone(),
                        value: token.to_string(),
                        reason,
                    }
                })?;
                if *arity == Arity::Set && items.contains(&item) {
                    continue;
                }
                items.push(item);
            }
            Ok(Value::Array(items))
        }
        TypeExpr::Optional(inner) => coerce_present(inner, raw, spec),
        TypeExpr::Nested(_) => Err(invalid(
            spec,
            raw,
            "a nested record takes no value of its own".to_string(),
        )),
    }
}

fn coerce_token(expr: &TypeExpr, token: &str) -> Result<Value, scalar::Reason> {
    match expr {
        TypeExpr::Scalar(kind) => parse_scalar(token, *kind),
        TypeExpr::Choice(allowed) => match_choice(token, allowed),
        TypeExpr::Custom { parser, .. } => parser.parse(token),
        TypeExpr::Optional(inner) => coerce_token(inner, token),
        _ => Err("expected a scalar value".to_string()),
    }
}

/// Checks that `value` is one `expr` could have produced from the command
/// line. Values for custom parsers are accepted as they are.
pub fn check_value(expr: &TypeExpr, value: &Value) -> Result<(), scalar::Reason> {
    match (expr, value) {
        (TypeExpr::Optional(_), Value::Null) => Ok(()),
        (TypeExpr::Optional(inner), other) => check_value(inner, other),
        (TypeExpr::Custom { .. }, _) => Ok(()),
        (_, Value::Null) => Err("None is not allowed here".to_string()),
        (TypeExpr::Scalar(kind), other) => check_scalar(other, *kind),
        (TypeExpr::Choice(allowed), other) if allowed.contains(other) => Ok(()),
        (TypeExpr::Choice(allowed), _) => Err(scalar::not_a_choice(allowed)),
        (TypeExpr::Collection { element, arity }, Value::Array(items)) => {
            if let Arity::Tuple(n) = arity {
                if items.len() != *n {
                    return Err(format!("expected exactly {n} values, got {}", items.len()));
                }
            }
            for item in items {
                check_value(element, item).map_err(|reason| format!("element {item}: {reason}"))?;
            }
            Ok(())
        }
        (TypeExpr::Collection { .. }, _) => Err("expected a list".to_string()),
        (TypeExpr::Nested(_), Value::Object(_)) => Ok(()),
        (TypeExpr::Nested(_), _) => Err("expected a table".to_string()),
    }
}

fn invalid(spec: &ArgumentSpec, raw: &RawValue, reason: String) -> ParseError {
    ParseError::InvalidValue {
        flag: spec.flag_name.clone(),
        value: raw.display(),
        reason,
    }
}

/// Coerces every spec, fetching raw tokens through `lookup`.
///
/// Leaves inside an optional record are skipped while that record is off:
/// its marker was given, or its default is `None` and none of its leaves
/// was given.
pub fn coerce_all<F>(specs: &[ArgumentSpec], mut lookup: F) -> Result<ParsedValues, ParseError>
where
    F: FnMut(&ArgumentSpec) -> Option<RawValue>,
{
    let raws: Vec<Option<RawValue>> = specs.iter().map(&mut lookup).collect();
    let given: Vec<&FieldPath> = specs
        .iter()
        .zip(&raws)
        .filter(|(_, raw)| raw.is_some())
        .map(|(spec, _)| &spec.dotted_path)
        .collect();

    let markers: IndexMap<&FieldPath, (&ArgumentSpec, bool)> = specs
        .iter()
        .zip(&raws)
        .filter(|(spec, _)| spec.role == SpecRole::NullMarker)
        .map(|(spec, raw)| (&spec.dotted_path, (spec, raw.is_some())))
        .collect();

    let group_on = |group: &FieldPath| -> bool {
        let Some((marker, marker_given)) = markers.get(group) else {
            return true;
        };
        if *marker_given {
            return false;
        }
        let default_on = marker.default.as_ref().is_some_and(|d| !d.is_null());
        default_on || given.iter().any(|path| path.is_strictly_under(group))
    };

    let mut parsed = ParsedValues::new();
    for (spec, raw) in specs.iter().zip(&raws) {
        if spec.role == SpecRole::Leaf && !spec.guards.iter().all(|g| group_on(g)) {
            tracing::trace!(flag = %spec.flag_name, "skipped: enclosing optional record is unset");
            continue;
        }
        tracing::trace!(flag = %spec.flag_name, raw = ?raw, "coercing");
        let value = coerce(raw.as_ref(), spec)?;
        let source = if raw.is_some() {
            ValueSource::CommandLine
        } else {
            ValueSource::Default
        };
        parsed.insert(spec.dotted_path.clone(), value, source);
    }
    Ok(parsed)
}
