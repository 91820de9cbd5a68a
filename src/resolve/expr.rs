use serde_json::Value;

use crate::schema::{FieldDefinition, ValueParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    /// Integer with the inclusive bounds of the declared Rust type.
    Int { min: i128, max: i128 },
    Float,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    List,
    Set,
    /// Exactly this many values.
    Tuple(usize),
}

/// Resolved shape of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Scalar(ScalarKind),
    /// Allowed literal values (strings or integers), in declaration order.
    Choice(Vec<Value>),
    Optional(Box<TypeExpr>),
    Collection {
        element: Box<TypeExpr>,
        arity: Arity,
    },
    Nested(Box<ResolvedRecord>),
    /// Read by a caller-supplied parser. `name` is the declared type.
    Custom { name: String, parser: ValueParser },
}

impl TypeExpr {
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeExpr::Optional(_))
    }

    /// The expression with one `Optional` layer removed.
    pub fn unwrap_optional(&self) -> &TypeExpr {
        match self {
            TypeExpr::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.unwrap_optional(), TypeExpr::Collection { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.unwrap_optional(), TypeExpr::Scalar(ScalarKind::Bool))
    }

    /// Placeholder shown for the value in help output.
    pub fn value_name(&self) -> String {
        match self {
            TypeExpr::Scalar(ScalarKind::Bool) => "BOOL".to_string(),
            TypeExpr::Scalar(ScalarKind::Int { .. }) => "INT".to_string(),
            TypeExpr::Scalar(ScalarKind::Float) => "FLOAT".to_string(),
            TypeExpr::Scalar(ScalarKind::Str) => "STR".to_string(),
            TypeExpr::Choice(values) => format!("{{{}}}", describe_literals(values, ",")),
            TypeExpr::Optional(inner) => inner.value_name(),
            TypeExpr::Collection { element, .. } => element.value_name(),
            TypeExpr::Nested(record) => record.name.to_uppercase(),
            TypeExpr::Custom { .. } => "VALUE".to_string(),
        }
    }
}

/// Renders literals without JSON quoting: `LA, NY`.
pub fn describe_literals(values: &[Value], sep: &str) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
}

/// Record with every field type resolved. Finite by construction: cycles
/// are rejected during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub name: String,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub definition: FieldDefinition,
    pub type_expr: TypeExpr,
}

impl ResolvedField {
    pub fn name(&self) -> &str {
        self.definition.name()
    }
}

impl PartialEq for ResolvedField {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.type_expr == other.type_expr
            && self.definition.default() == other.definition.default()
    }
}
