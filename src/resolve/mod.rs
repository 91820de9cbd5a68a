//! Turns declared field types into resolved [`TypeExpr`]s.

mod custom;
mod expr;
mod registry;

use std::any::TypeId;

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{DeclaredType, FieldPath, RecordRef, SchemaError, ValueParser};

pub use custom::CustomParsers;
pub use expr::{Arity, ResolvedField, ResolvedRecord, ScalarKind, TypeExpr, describe_literals};
pub use registry::TypeRegistry;

/// Generic parameter bindings in effect for the record being resolved.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, DeclaredType>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, param: impl Into<String>, declared: DeclaredType) -> Self {
        self.bindings.insert(param.into(), declared);
        self
    }

    pub fn get(&self, param: &str) -> Option<&DeclaredType> {
        self.bindings.get(param)
    }
}

/// A record on the resolution stack. Bound arguments are ignored: a record
/// nested inside itself repeats its definition whatever its arguments are.
struct Frame {
    type_id: TypeId,
    name: String,
}

static NO_PARSERS: CustomParsers = CustomParsers::new();

pub struct Resolver<'r> {
    registry: &'r TypeRegistry,
    parsers: &'r CustomParsers,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            parsers: &NO_PARSERS,
        }
    }

    pub fn with_parsers(mut self, parsers: &'r CustomParsers) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn resolve_root(&self, record: RecordRef) -> Result<ResolvedRecord, SchemaError> {
        self.resolve_root_at(record, &FieldPath::root())
    }

    /// Resolves a root record whose fields live below `prefix`. The prefix
    /// labels errors and is the base for field parser paths.
    pub fn resolve_root_at(&self, record: RecordRef, prefix: &FieldPath) -> Result<ResolvedRecord, SchemaError> {
        let mut stack = Vec::new();
        self.resolve_record(record, &[], prefix, &mut stack)
    }

    /// Resolves a single declared type. `path` only labels errors.
    pub fn resolve_type(
        &self,
        declared: &DeclaredType,
        scope: &Scope,
        path: &FieldPath,
    ) -> Result<TypeExpr, SchemaError> {
        let mut stack = Vec::new();
        self.resolve(declared, scope, path, &mut stack, None)
    }

    fn resolve_record(
        &self,
        record: RecordRef,
        args: &[DeclaredType],
        at: &FieldPath,
        stack: &mut Vec<Frame>,
    ) -> Result<ResolvedRecord, SchemaError> {
        let definition = record.definition();

        if let Some(start) = stack.iter().position(|frame| frame.type_id == record.type_id()) {
            let mut cycle: Vec<&str> = stack[start..].iter().map(|f| f.name.as_str()).collect();
            cycle.push(definition.name());
            return Err(SchemaError::RecursiveSchema {
                path: at.clone(),
                record: definition.name().to_string(),
                cycle: cycle.join(" -> "),
            });
        }

        if args.len() > definition.type_params().len() {
            return Err(SchemaError::UnsupportedType {
                path: at.clone(),
                declared: DeclaredType::Applied(record, args.to_vec()).to_string(),
                reason: format!(
                    "record '{}' takes {} type parameters",
                    definition.name(),
                    definition.type_params().len()
                ),
            });
        }

        let mut scope = Scope {
            bindings: definition.bindings().clone(),
        };
        for (param, arg) in definition.type_params().iter().zip(args) {
            scope.bindings.insert(param.clone(), arg.clone());
        }

        stack.push(Frame {
            type_id: record.type_id(),
            name: definition.name().to_string(),
        });

        let mut fields = Vec::with_capacity(definition.fields().len());
        for field in definition.fields() {
            let path = at.child(field.name());
            let parser = self.parsers.for_field(&path, field);
            let type_expr = self.resolve(field.declared_type(), &scope, &path, stack, parser)?;
            fields.push(ResolvedField {
                definition: field.clone(),
                type_expr,
            });
        }

        stack.pop();
        tracing::trace!(record = definition.name(), path = %at, "resolved record");

        Ok(ResolvedRecord {
            name: definition.name().to_string(),
            fields,
        })
    }

    fn resolve(
        &self,
        declared: &DeclaredType,
        scope: &Scope,
        path: &FieldPath,
        stack: &mut Vec<Frame>,
        parser: Option<ValueParser>,
    ) -> Result<TypeExpr, SchemaError> {
        let unsupported = |reason: &str| SchemaError::UnsupportedType {
            path: path.clone(),
            declared: declared.to_string(),
            reason: reason.to_string(),
        };

        if let Some(custom) = self.custom(declared, parser) {
            return Ok(custom);
        }

        match declared {
            DeclaredType::Bool => Ok(TypeExpr::Scalar(ScalarKind::Bool)),
            DeclaredType::Int { min, max } => {
                if min > max {
                    return Err(unsupported("integer bounds are empty"));
                }
                Ok(TypeExpr::Scalar(ScalarKind::Int {
                    min: *min,
                    max: *max,
                }))
            }
            DeclaredType::Float => Ok(TypeExpr::Scalar(ScalarKind::Float)),
            DeclaredType::Str => Ok(TypeExpr::Scalar(ScalarKind::Str)),
            DeclaredType::NoneType => Err(unsupported("a field cannot hold only None")),
            DeclaredType::Literal(values) => {
                let mut allowed: Vec<Value> = Vec::with_capacity(values.len());
                for value in values {
                    if !is_literal(value) {
                        return Err(unsupported("literals must be strings or integers"));
                    }
                    if !allowed.contains(value) {
                        allowed.push(value.clone());
                    }
                }
                if allowed.is_empty() {
                    return Err(unsupported("a literal needs at least one value"));
                }
                Ok(TypeExpr::Choice(allowed))
            }
            DeclaredType::Union(members) => {
                self.resolve_union(declared, members, scope, path, stack, parser)
            }
            DeclaredType::List(element)
            | DeclaredType::Sequence(element)
            | DeclaredType::VarTuple(element) => {
                let element = self.resolve_element(element, scope, path, stack, parser)?;
                collection(declared, element, Arity::List, path)
            }
            DeclaredType::Set(element) => {
                let element = self.resolve_element(element, scope, path, stack, parser)?;
                collection(declared, element, Arity::Set, path)
            }
            DeclaredType::Tuple(members) => {
                if members.is_empty() {
                    return Err(unsupported("empty tuples carry no value"));
                }
                let arity = Arity::Tuple(members.len());
                if let Some(parser) = parser {
                    let name = declared.to_string();
                    return collection(declared, TypeExpr::Custom { name, parser }, arity, path);
                }
                // Members are compared once resolved, so `(T, u16)` with `T = u16` is uniform.
                let mut resolved = Vec::with_capacity(members.len());
                for member in members {
                    resolved.push(self.resolve(member, scope, path, stack, None)?);
                }
                if resolved.iter().any(|member| *member != resolved[0]) {
                    return Err(unsupported(
                        "tuples with different member types have no unambiguous command-line form",
                    ));
                }
                let element = resolved.swap_remove(0);
                collection(declared, element, arity, path)
            }
            DeclaredType::Map(..) => Err(unsupported("maps cannot be expressed as flags")),
            DeclaredType::Record(record) => {
                let resolved = self.resolve_record(*record, &[], path, stack)?;
                Ok(TypeExpr::Nested(Box::new(resolved)))
            }
            DeclaredType::Applied(record, args) => {
                let args = args
                    .iter()
                    .map(|arg| substitute(arg, scope, path))
                    .collect::<Result<Vec<_>, _>>()?;
                let resolved = self.resolve_record(*record, &args, path, stack)?;
                Ok(TypeExpr::Nested(Box::new(resolved)))
            }
            DeclaredType::Forward(name) => {
                let record = self
                    .registry
                    .lookup(name)
                    .ok_or_else(|| unsupported("unresolved forward reference"))?;
                let resolved = self.resolve_record(record, &[], path, stack)?;
                Ok(TypeExpr::Nested(Box::new(resolved)))
            }
            DeclaredType::Param(name) => {
                let bound = scope
                    .get(name)
                    .ok_or_else(|| unsupported("unconstrained generic parameter"))?;
                self.resolve(bound, &Scope::default(), path, stack, parser)
            }
            DeclaredType::Callable => Err(unsupported("callables cannot be read from a string")),
            DeclaredType::Any => Err(unsupported("an unconstrained type has no command-line form")),
        }
    }

    /// A parser takes over any type read from one token, except bool.
    /// Parsers registered for the type win over the field's own parser.
    fn custom(&self, declared: &DeclaredType, parser: Option<ValueParser>) -> Option<TypeExpr> {
        let structural = matches!(
            declared,
            DeclaredType::Bool
                | DeclaredType::NoneType
                | DeclaredType::Union(_)
                | DeclaredType::Param(_)
                | DeclaredType::List(_)
                | DeclaredType::Set(_)
                | DeclaredType::Sequence(_)
                | DeclaredType::VarTuple(_)
                | DeclaredType::Tuple(_)
                | DeclaredType::Record(_)
                | DeclaredType::Applied(..)
                | DeclaredType::Forward(_)
        );
        if structural {
            return None;
        }
        let parser = self.parsers.for_type(declared).or(parser)?;
        Some(TypeExpr::Custom {
            name: declared.to_string(),
            parser,
        })
    }

    /// Collection elements: a field parser reads each element whole, so the
    /// element type itself is not resolved.
    fn resolve_element(
        &self,
        element: &DeclaredType,
        scope: &Scope,
        path: &FieldPath,
        stack: &mut Vec<Frame>,
        parser: Option<ValueParser>,
    ) -> Result<TypeExpr, SchemaError> {
        match parser {
            Some(parser) => Ok(TypeExpr::Custom {
                name: element.to_string(),
                parser,
            }),
            None => self.resolve(element, scope, path, stack, None),
        }
    }

    fn resolve_union(
        &self,
        declared: &DeclaredType,
        members: &[DeclaredType],
        scope: &Scope,
        path: &FieldPath,
        stack: &mut Vec<Frame>,
        parser: Option<ValueParser>,
    ) -> Result<TypeExpr, SchemaError> {
        let mut flat = Vec::new();
        flatten_union(members, &mut flat);

        let nullable = flat.iter().any(|m| matches!(m, DeclaredType::NoneType));
        let mut others: Vec<&DeclaredType> = Vec::new();
        for member in flat.iter().copied() {
            if matches!(member, DeclaredType::NoneType) {
                continue;
            }
            if !others.contains(&member) {
                others.push(member);
            }
        }

        let inner = match (others.as_slice(), parser) {
            ([], _) => {
                return Err(SchemaError::UnsupportedType {
                    path: path.clone(),
                    declared: declared.to_string(),
                    reason: "a field cannot hold only None".to_string(),
                });
            }
            ([single], _) => self.resolve(single, scope, path, stack, parser)?,
            (_, Some(parser)) => TypeExpr::Custom {
                name: declared.to_string(),
                parser,
            },
            (many, None) if many.iter().all(|m| is_string_like(m, scope)) => {
                TypeExpr::Scalar(ScalarKind::Str)
            }
            _ => {
                return Err(SchemaError::UnsupportedType {
                    path: path.clone(),
                    declared: declared.to_string(),
                    reason: "only `X | None` unions can be read from the command line".to_string(),
                });
            }
        };

        if nullable && !inner.is_optional() {
            Ok(TypeExpr::Optional(Box::new(inner)))
        } else {
            Ok(inner)
        }
    }

}

fn collection(
    declared: &DeclaredType,
    element: TypeExpr,
    arity: Arity,
    path: &FieldPath,
) -> Result<TypeExpr, SchemaError> {
    if !matches!(
        element,
        TypeExpr::Scalar(_) | TypeExpr::Choice(_) | TypeExpr::Custom { .. }
    ) {
        return Err(SchemaError::UnsupportedType {
            path: path.clone(),
            declared: declared.to_string(),
            reason: "collection elements must be scalars or literals".to_string(),
        });
    }
    Ok(TypeExpr::Collection {
        element: Box::new(element),
        arity,
    })
}

fn is_literal(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Number(n) => n.is_i64() || n.is_u64(),
        _ => false,
    }
}

fn is_string_like(declared: &DeclaredType, scope: &Scope) -> bool {
    match declared {
        DeclaredType::Str => true,
        DeclaredType::Literal(values) => values.iter().all(Value::is_string),
        DeclaredType::Param(name) => scope.get(name).is_some_and(|b| is_string_like(b, &Scope::default())),
        _ => false,
    }
}

fn flatten_union<'a>(members: &'a [DeclaredType], out: &mut Vec<&'a DeclaredType>) {
    for member in members {
        match member {
            DeclaredType::Union(nested) => flatten_union(nested, out),
            other => out.push(other),
        }
    }
}

/// Replaces generic parameters with their bindings so the result can be
/// resolved in another record's scope.
fn substitute(
    declared: &DeclaredType,
    scope: &Scope,
    path: &FieldPath,
) -> Result<DeclaredType, SchemaError> {
    let many = |items: &[DeclaredType]| {
        items
            .iter()
            .map(|item| substitute(item, scope, path))
            .collect::<Result<Vec<_>, _>>()
    };
    let one = |item: &DeclaredType| substitute(item, scope, path).map(Box::new);

    Ok(match declared {
        DeclaredType::Param(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnsupportedType {
                path: path.clone(),
                declared: declared.to_string(),
                reason: "unconstrained generic parameter".to_string(),
            })?,
        DeclaredType::Union(members) => DeclaredType::Union(many(members.as_slice())?),
        DeclaredType::Tuple(members) => DeclaredType::Tuple(many(members.as_slice())?),
        DeclaredType::Applied(record, args) => DeclaredType::Applied(*record, many(args.as_slice())?),
        DeclaredType::List(inner) => DeclaredType::List(one(&**inner)?),
        DeclaredType::Set(inner) => DeclaredType::Set(one(&**inner)?),
        DeclaredType::Sequence(inner) => DeclaredType::Sequence(one(&**inner)?),
        DeclaredType::VarTuple(inner) => DeclaredType::VarTuple(one(&**inner)?),
        DeclaredType::Map(key, value) => DeclaredType::Map(one(&**key)?, one(&**value)?),
        other => other.clone(),
    })
}
