use std::any::TypeId;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::schema::{DeclaredType, RecordRef};

/// Records known by name, used to resolve forward references.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    by_name: IndexMap<String, RecordRef>,
    seen: HashSet<TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `record` and every record reachable from its fields.
    pub fn collect(&mut self, record: RecordRef) {
        if !self.seen.insert(record.type_id()) {
            return;
        }
        let definition = record.definition();
        if let Some(existing) = self.by_name.get(definition.name()) {
            tracing::warn!(
                name = definition.name(),
                kept = ?existing,
                ignored = ?record,
                "two records share a name; forward references use the first"
            );
        } else {
            self.by_name.insert(definition.name().to_string(), record);
        }

        for field in definition.fields() {
            self.collect_declared(field.declared_type());
        }
        for bound in definition.bindings().values() {
            self.collect_declared(bound);
        }
    }

    fn collect_declared(&mut self, declared: &DeclaredType) {
        match declared {
            DeclaredType::Record(record) => self.collect(*record),
            DeclaredType::Applied(record, args) => {
                self.collect(*record);
                for arg in args {
                    self.collect_declared(arg);
                }
            }
            DeclaredType::Union(members) | DeclaredType::Tuple(members) => {
                for member in members {
                    self.collect_declared(member);
                }
            }
            DeclaredType::List(inner)
            | DeclaredType::Set(inner)
            | DeclaredType::Sequence(inner)
            | DeclaredType::VarTuple(inner) => self.collect_declared(inner),
            DeclaredType::Map(key, value) => {
                self.collect_declared(key);
                self.collect_declared(value);
            }
            _ => {}
        }
    }

    pub fn lookup(&self, name: &str) -> Option<RecordRef> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}
