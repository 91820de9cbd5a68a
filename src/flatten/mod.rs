//! Flattens a resolved record tree into one [`ArgumentSpec`] per leaf.

pub mod argname;

use indexmap::IndexMap;
use serde_json::Value;

use crate::coerce::check_value;
use crate::resolve::{ResolvedField, ResolvedRecord, ScalarKind, TypeExpr};
use crate::schema::{FieldPath, SchemaError};

pub use argname::FlagNaming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecRole {
    /// A leaf field of the record tree.
    Leaf,
    /// `--<path> none` switch that sets an optional nested record to `None`.
    NullMarker,
}

/// One command-line flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub dotted_path: FieldPath,
    /// Long flag including the leading dashes, e.g. `--nested-city`.
    pub flag_name: String,
    pub type_expr: TypeExpr,
    pub default: Option<Value>,
    pub help: Option<String>,
    pub required: bool,
    pub role: SpecRole,
    /// Paths of the optional records enclosing this spec, outermost first.
    pub guards: Vec<FieldPath>,
    /// Tokens read as `None`. Only meaningful for optional leaves.
    pub none_keywords: Vec<String>,
}

impl ArgumentSpec {
    /// Flag name without the leading dashes; also the clap argument id.
    pub fn long_name(&self) -> &str {
        self.flag_name
            .strip_prefix("--")
            .unwrap_or(&self.flag_name)
    }

    pub fn is_multiple(&self) -> bool {
        self.type_expr.is_collection()
    }
}

/// Accumulates specs and the flag table used for collision checks.
#[derive(Default)]
struct FlatState {
    specs: Vec<ArgumentSpec>,
    flags: IndexMap<String, FieldPath>,
}

impl FlatState {
    fn emit(&mut self, spec: ArgumentSpec) -> Result<(), SchemaError> {
        if let Some(first) = self.flags.get(&spec.flag_name) {
            return Err(SchemaError::DuplicateArgument {
                flag: spec.flag_name.clone(),
                first: first.clone(),
                second: spec.dotted_path.clone(),
            });
        }
        tracing::trace!(flag = %spec.flag_name, path = %spec.dotted_path, "emitted argument spec");
        self.flags
            .insert(spec.flag_name.clone(), spec.dotted_path.clone());
        self.specs.push(spec);
        Ok(())
    }
}

pub struct Flattener {
    naming: FlagNaming,
}

impl Flattener {
    pub fn new(naming: FlagNaming) -> Self {
        Self { naming }
    }

    pub fn flatten(&self, record: &ResolvedRecord) -> Result<Vec<ArgumentSpec>, SchemaError> {
        self.flatten_at(record, &FieldPath::root(), None)
    }

    /// Flattens `record` below `prefix`. `seed` is a default value for the
    /// whole record; its entries override the fields' own defaults.
    pub fn flatten_at(
        &self,
        record: &ResolvedRecord,
        prefix: &FieldPath,
        seed: Option<&Value>,
    ) -> Result<Vec<ArgumentSpec>, SchemaError> {
        let mut state = FlatState::default();
        self.walk(record, prefix, seed, &[], &mut state)?;
        tracing::debug!(record = %record.name, flags = state.specs.len(), "flattened record");
        Ok(state.specs)
    }

    fn walk(
        &self,
        record: &ResolvedRecord,
        at: &FieldPath,
        seed: Option<&Value>,
        guards: &[FieldPath],
        state: &mut FlatState,
    ) -> Result<(), SchemaError> {
        for field in &record.fields {
            let path = at.child(field.name());
            let default = seed
                .and_then(|s| s.get(field.name()))
                .or(field.definition.default())
                .cloned();

            match &field.type_expr {
                TypeExpr::Nested(inner) => {
                    if let Some(default) = &default {
                        validate_default(&field.type_expr, default, &path)?;
                    }
                    self.walk(inner, &path, default.as_ref(), guards, state)?
                }
                TypeExpr::Optional(inner) => match inner.as_ref() {
                    TypeExpr::Nested(inner) => {
                        self.walk_optional(field, inner, path, default, guards, state)?
                    }
                    _ => state.emit(self.leaf(field, path, default, guards)?)?,
                },
                _ => state.emit(self.leaf(field, path, default, guards)?)?,
            }
        }
        Ok(())
    }

    fn walk_optional(
        &self,
        field: &ResolvedField,
        record: &ResolvedRecord,
        path: FieldPath,
        default: Option<Value>,
        guards: &[FieldPath],
        state: &mut FlatState,
    ) -> Result<(), SchemaError> {
        let group_default = default.unwrap_or(Value::Null);
        validate_default(&field.type_expr, &group_default, &path)?;
        let help = field
            .definition
            .help_text()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Pass `none` to leave {path} unset"));

        state.emit(ArgumentSpec {
            dotted_path: path.clone(),
            flag_name: self.naming.flag_name(&path),
            type_expr: TypeExpr::Choice(vec![Value::from("none"), Value::from("None")]),
            default: Some(group_default.clone()),
            help: Some(help),
            required: false,
            role: SpecRole::NullMarker,
            guards: guards.to_vec(),
            none_keywords: Vec::new(),
        })?;

        let mut inner_guards = guards.to_vec();
        inner_guards.push(path.clone());
        let seed = (!group_default.is_null()).then_some(&group_default);
        self.walk(record, &path, seed, &inner_guards, state)
    }

    fn leaf(
        &self,
        field: &ResolvedField,
        path: FieldPath,
        default: Option<Value>,
        guards: &[FieldPath],
    ) -> Result<ArgumentSpec, SchemaError> {
        let type_expr = field.type_expr.clone();
        let (default, required) = match &type_expr {
            TypeExpr::Optional(_) => (Some(default.unwrap_or(Value::Null)), false),
            TypeExpr::Scalar(ScalarKind::Bool) => (Some(default.unwrap_or(Value::Bool(false))), false),
            _ => {
                let required = default.is_none() && field.definition.is_required();
                (default, required)
            }
        };
        if let Some(default) = &default {
            validate_default(&type_expr, default, &path)?;
        }
        let none_keywords = none_keywords(field, &type_expr, default.as_ref());

        Ok(ArgumentSpec {
            flag_name: self.naming.flag_name(&path),
            dotted_path: path,
            type_expr,
            default,
            help: field.definition.help_text().map(str::to_string),
            required,
            role: SpecRole::Leaf,
            guards: guards.to_vec(),
            none_keywords,
        })
    }
}

/// Defaults come from record definitions or a defaults document and are
/// checked against the resolved type before any parsing happens.
fn validate_default(type_expr: &TypeExpr, default: &Value, path: &FieldPath) -> Result<(), SchemaError> {
    check_value(type_expr, default).map_err(|reason| SchemaError::InvalidDefault {
        path: path.clone(),
        reason,
    })
}

/// Tokens that mean `None` for an optional leaf.
///
/// An optional string whose default is already `None` keeps `none` as an
/// ordinary string unless keywords are configured explicitly; optional
/// collections never treat their tokens as keywords.
fn none_keywords(field: &ResolvedField, type_expr: &TypeExpr, default: Option<&Value>) -> Vec<String> {
    let TypeExpr::Optional(inner) = type_expr else {
        return Vec::new();
    };
    if let Some(keywords) = field.definition.none_keyword_list() {
        return keywords;
    }
    match inner.as_ref() {
        TypeExpr::Collection { .. } => Vec::new(),
        TypeExpr::Scalar(ScalarKind::Str) if default.is_none_or(Value::is_null) => Vec::new(),
        _ => vec!["None".to_string(), "none".to_string()],
    }
}

/// Checks flag uniqueness over specs gathered from several records.
pub fn check_unique(specs: &[ArgumentSpec]) -> Result<(), SchemaError> {
    let mut seen: IndexMap<&str, &FieldPath> = IndexMap::with_capacity(specs.len());
    for spec in specs {
        if let Some(first) = seen.insert(&spec.flag_name, &spec.dotted_path) {
            return Err(SchemaError::DuplicateArgument {
                flag: spec.flag_name.clone(),
                first: first.clone(),
                second: spec.dotted_path.clone(),
            });
        }
    }
    Ok(())
}
