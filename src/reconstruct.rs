//! Rebuilds nested record values from flat parsed values.

use serde_json::{Map, Value};

use crate::coerce::{ParsedValues, ValueSource};
use crate::error::ArgsError;
use crate::resolve::{ResolvedRecord, TypeExpr};
use crate::schema::{FieldPath, Record};

/// Rebuilds the object for `record`, whose fields live below `prefix`.
/// Fields come out in declaration order.
pub fn reconstruct(
    record: &ResolvedRecord,
    parsed: &ParsedValues,
    prefix: &FieldPath,
) -> Result<Value, ArgsError> {
    let mut object = Map::with_capacity(record.fields.len());

    for field in &record.fields {
        let path = prefix.child(field.name());
        let value = match &field.type_expr {
            TypeExpr::Nested(inner) => reconstruct(inner, parsed, &path)?,
            TypeExpr::Optional(inner) => match inner.as_ref() {
                TypeExpr::Nested(inner) => optional_record(inner, parsed, &path)?,
                _ => leaf(parsed, &path)?,
            },
            _ => leaf(parsed, &path)?,
        };
        object.insert(field.name().to_string(), value);
    }

    Ok(Value::Object(object))
}

fn optional_record(
    record: &ResolvedRecord,
    parsed: &ParsedValues,
    path: &FieldPath,
) -> Result<Value, ArgsError> {
    let marker = parsed.get(path).ok_or_else(|| {
        ArgsError::InternalConsistency(format!("no marker value for optional record '{path}'"))
    })?;

    if marker.source == ValueSource::CommandLine {
        return Ok(Value::Null);
    }
    if marker.value.is_null() && !parsed.any_explicit_under(path) {
        return Ok(Value::Null);
    }
    reconstruct(record, parsed, path)
}

fn leaf(parsed: &ParsedValues, path: &FieldPath) -> Result<Value, ArgsError> {
    parsed
        .get(path)
        .map(|p| p.value.clone())
        .ok_or_else(|| ArgsError::InternalConsistency(format!("no parsed value for '{path}'")))
}

/// Deserializes a rebuilt value into the record type.
pub fn instantiate<T: Record>(value: Value) -> Result<T, ArgsError> {
    serde_json::from_value(value).map_err(|source| ArgsError::Instantiate {
        record: T::definition().name().to_string(),
        source,
    })
}
