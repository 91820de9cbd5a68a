use serde_json::{Number, Value};

use crate::resolve::{ScalarKind, describe_literals};

/// Failure reason; the caller attaches flag and raw value.
pub type Reason = String;

pub fn parse_scalar(raw: &str, kind: ScalarKind) -> Result<Value, Reason> {
    match kind {
        ScalarKind::Bool => parse_bool(raw).map(Value::Bool),
        ScalarKind::Int { min, max } => parse_int(raw, min, max),
        ScalarKind::Float => parse_float(raw),
        ScalarKind::Str => Ok(Value::String(raw.to_string())),
    }
}

pub fn parse_bool(raw: &str) -> Result<bool, Reason> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected true or false".to_string())
    }
}

pub fn parse_int(raw: &str, min: i128, max: i128) -> Result<Value, Reason> {
    let n: i128 = raw
        .trim()
        .parse()
        .map_err(|_| "expected an integer".to_string())?;
    if n < min || n > max {
        return Err(format!("must be between {min} and {max}"));
    }

    // Bounds come from at most 64-bit Rust integers.
    if let Ok(u) = u64::try_from(n) {
        Ok(Value::Number(Number::from(u)))
    } else if let Ok(i) = i64::try_from(n) {
        Ok(Value::Number(Number::from(i)))
    } else {
        Err(format!("{n} does not fit in 64 bits"))
    }
}

pub fn parse_float(raw: &str) -> Result<Value, Reason> {
    let f: f64 = raw
        .trim()
        .parse()
        .map_err(|_| "expected a number".to_string())?;
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| "expected a finite number".to_string())
}

/// Checks a value that is already in JSON form, such as a default.
pub fn check_scalar(value: &Value, kind: ScalarKind) -> Result<(), Reason> {
    match kind {
        ScalarKind::Bool if value.is_boolean() => Ok(()),
        ScalarKind::Bool => Err("expected true or false".to_string()),
        ScalarKind::Int { min, max } => {
            let n = match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from)),
                _ => None,
            }
            .ok_or_else(|| "expected an integer".to_string())?;
            if n < min || n > max {
                return Err(format!("must be between {min} and {max}"));
            }
            Ok(())
        }
        ScalarKind::Float if value.is_number() => Ok(()),
        ScalarKind::Float => Err("expected a number".to_string()),
        ScalarKind::Str if value.is_string() => Ok(()),
        ScalarKind::Str => Err("expected a string".to_string()),
    }
}

/// Matches `raw` against the allowed literals, converting it to each
/// literal's kind in turn.
pub fn match_choice(raw: &str, allowed: &[Value]) -> Result<Value, Reason> {
    let found = allowed.iter().find(|literal| match literal {
        Value::String(s) => s == raw,
        Value::Number(n) => match (raw.trim().parse::<i64>(), n.as_i64()) {
            (Ok(parsed), Some(expected)) => parsed == expected,
            _ => match (raw.trim().parse::<u64>(), n.as_u64()) {
                (Ok(parsed), Some(expected)) => parsed == expected,
                _ => false,
            },
        },
        _ => false,
    });

    found.cloned().ok_or_else(|| not_a_choice(allowed))
}

pub(super) fn not_a_choice(allowed: &[Value]) -> Reason {
    format!("expected one of {{{}}}", describe_literals(allowed, ", "))
}
