use clap::{Arg, ArgAction};
use serde_json::Value;

use crate::flatten::{ArgumentSpec, SpecRole};
use crate::resolve::{ScalarKind, TypeExpr, describe_literals};

/// Registers one argument with clap. clap only tokenizes: values stay strings
/// and requiredness is checked by the coercer.
pub fn to_clap_arg(spec: &ArgumentSpec) -> Arg {
    let long = spec.long_name().to_string();
    let arg = Arg::new(long.clone())
        .long(long)
        .value_name(spec.type_expr.value_name())
        .help(help_text(spec));

    if spec.is_multiple() {
        arg.num_args(0..)
            .action(ArgAction::Append)
            .allow_negative_numbers(is_numeric(&spec.type_expr))
    } else if spec.type_expr.is_bool() && spec.role == SpecRole::Leaf {
        arg.num_args(0..=1)
            .default_missing_value("true")
            .action(ArgAction::Set)
    } else {
        arg.num_args(1)
            .action(ArgAction::Set)
            .allow_negative_numbers(is_numeric(&spec.type_expr))
    }
}

fn is_numeric(expr: &TypeExpr) -> bool {
    match expr {
        TypeExpr::Scalar(ScalarKind::Int { .. } | ScalarKind::Float) => true,
        TypeExpr::Choice(values) => values.iter().any(Value::is_number),
        TypeExpr::Optional(inner) => is_numeric(inner),
        TypeExpr::Collection { element, .. } => is_numeric(element),
        _ => false,
    }
}

fn help_text(spec: &ArgumentSpec) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(help) = &spec.help {
        parts.push(help.clone());
    }
    if spec.required {
        parts.push("(required)".to_string());
    } else if let Some(default) = spec.default.as_ref() {
        if spec.role == SpecRole::Leaf {
            parts.push(format!("[default: {}]", render_default(default)));
        }
    }
    if !spec.none_keywords.is_empty() {
        parts.push(format!("[none: {}]", spec.none_keywords.join("/")));
    }
    parts.join(" ")
}

fn render_default(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{}]", describe_literals(items, ", ")),
        other => other.to_string(),
    }
}
