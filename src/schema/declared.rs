use std::any::TypeId;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use super::record::{Record, RecordDefinition};

/// Handle to a record type: its identity plus a way to obtain its definition.
#[derive(Clone, Copy)]
pub struct RecordRef {
    type_id: TypeId,
    type_name: &'static str,
    definition: fn() -> RecordDefinition,
}

impl RecordRef {
    pub fn of<T: Record>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            definition: T::definition,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn definition(&self) -> RecordDefinition {
        (self.definition)()
    }

    /// Last path segment of the Rust type name, without generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self
            .type_name
            .split_once('<')
            .map_or(self.type_name, |(base, _)| base);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for RecordRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordRef").field(&self.type_name).finish()
    }
}

/// The type of a field as the record author declared it, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Bool,
    Int { min: i128, max: i128 },
    Float,
    Str,
    NoneType,
    Literal(Vec<Value>),
    Union(Vec<DeclaredType>),
    List(Box<DeclaredType>),
    Set(Box<DeclaredType>),
    Sequence(Box<DeclaredType>),
    Tuple(Vec<DeclaredType>),
    /// Tuple of any length with a single element type.
    VarTuple(Box<DeclaredType>),
    Map(Box<DeclaredType>, Box<DeclaredType>),
    Record(RecordRef),
    /// A generic record with its type parameters bound in declaration order.
    Applied(RecordRef, Vec<DeclaredType>),
    /// A record referenced by name, looked up when the parser is built.
    Forward(String),
    /// A generic type parameter of the enclosing record.
    Param(String),
    Callable,
    Any,
}

impl DeclaredType {
    pub fn int() -> Self {
        Self::Int {
            min: i64::MIN as i128,
            max: i64::MAX as i128,
        }
    }

    pub fn optional(inner: DeclaredType) -> Self {
        Self::Union(vec![inner, Self::NoneType])
    }

    pub fn list(element: DeclaredType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: DeclaredType) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn tuple(members: impl IntoIterator<Item = DeclaredType>) -> Self {
        Self::Tuple(members.into_iter().collect())
    }

    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn union(members: impl IntoIterator<Item = DeclaredType>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn record<T: Record>() -> Self {
        Self::Record(RecordRef::of::<T>())
    }

    pub fn applied<T: Record>(args: impl IntoIterator<Item = DeclaredType>) -> Self {
        Self::Applied(RecordRef::of::<T>(), args.into_iter().collect())
    }

    pub fn forward(name: impl Into<String>) -> Self {
        Self::Forward(name.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    /// Whether the declaration admits `None` at its top level.
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::NoneType => true,
            Self::Union(members) => members.iter().any(Self::is_nullable),
            _ => false,
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, items: &[DeclaredType], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int { .. } => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::NoneType => f.write_str("None"),
            Self::Literal(values) => {
                let values: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "literal[{}]", values.join(", "))
            }
            Self::Union(members) => join(f, members, " | "),
            Self::List(element) => write!(f, "list[{element}]"),
            Self::Set(element) => write!(f, "set[{element}]"),
            Self::Sequence(element) => write!(f, "sequence[{element}]"),
            Self::Tuple(members) => {
                f.write_str("tuple[")?;
                join(f, members, ", ")?;
                f.write_str("]")
            }
            Self::VarTuple(element) => write!(f, "tuple[{element}, ...]"),
            Self::Map(key, value) => write!(f, "map[{key}, {value}]"),
            Self::Record(record) => f.write_str(record.short_name()),
            Self::Applied(record, args) => {
                write!(f, "{}[", record.short_name())?;
                join(f, args, ", ")?;
                f.write_str("]")
            }
            Self::Forward(name) => write!(f, "'{name}'"),
            Self::Param(name) => f.write_str(name),
            Self::Callable => f.write_str("callable"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Maps a Rust type onto the [`DeclaredType`] it is declared as.
///
/// Records opt in with [`declare_records!`](crate::declare_records).
pub trait Declare {
    fn declared_type() -> DeclaredType;
}

macro_rules! declare_int {
    ($($t:ty),* $(,)?) => {$(
        impl Declare for $t {
            fn declared_type() -> DeclaredType {
                DeclaredType::Int {
                    min: <$t>::MIN as i128,
                    max: <$t>::MAX as i128,
                }
            }
        }
    )*};
}
declare_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! declare_as {
    ($variant:ident: $($t:ty),* $(,)?) => {$(
        impl Declare for $t {
            fn declared_type() -> DeclaredType {
                DeclaredType::$variant
            }
        }
    )*};
}
declare_as!(Float: f32, f64);
declare_as!(Str: String, PathBuf);
declare_as!(Bool: bool);

impl<T: Declare> Declare for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::optional(T::declared_type())
    }
}

impl<T: Declare> Declare for Box<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }
}

impl<T: Declare> Declare for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::list(T::declared_type())
    }
}

impl<T: Declare, S> Declare for HashSet<T, S> {
    fn declared_type() -> DeclaredType {
        DeclaredType::set(T::declared_type())
    }
}

impl<T: Declare> Declare for BTreeSet<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::set(T::declared_type())
    }
}

impl<T: Declare, const N: usize> Declare for [T; N] {
    fn declared_type() -> DeclaredType {
        DeclaredType::Tuple(vec![T::declared_type(); N])
    }
}

macro_rules! declare_tuple {
    ($($name:ident),+) => {
        impl<$($name: Declare),+> Declare for ($($name,)+) {
            fn declared_type() -> DeclaredType {
                DeclaredType::Tuple(vec![$($name::declared_type()),+])
            }
        }
    };
}
declare_tuple!(A);
declare_tuple!(A, B);
declare_tuple!(A, B, C);
declare_tuple!(A, B, C, D);

/// Implements [`Declare`] for record types so they can be used with
/// [`FieldDefinition::of`](crate::schema::FieldDefinition::of), including
/// inside `Option<...>`.
#[macro_export]
macro_rules! declare_records {
    ($($t:ty),* $(,)?) => {$(
        impl $crate::schema::Declare for $t {
            fn declared_type() -> $crate::schema::DeclaredType {
                $crate::schema::DeclaredType::record::<$t>()
            }
        }
    )*};
}
