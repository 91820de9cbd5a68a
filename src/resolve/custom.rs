use crate::schema::{DeclaredType, FieldDefinition, FieldPath, ValueParser};

/// Caller-supplied token parsers, looked up by declared type or by field path.
#[derive(Debug, Clone, Default)]
pub struct CustomParsers {
    by_type: Vec<(DeclaredType, ValueParser)>,
    by_field: Vec<(FieldPath, ValueParser)>,
}

impl CustomParsers {
    pub const fn new() -> Self {
        Self {
            by_type: Vec::new(),
            by_field: Vec::new(),
        }
    }

    /// Later registrations for the same type replace earlier ones.
    pub fn insert_type(&mut self, declared: DeclaredType, parser: ValueParser) {
        self.by_type.retain(|(existing, _)| *existing != declared);
        self.by_type.push((declared, parser));
    }

    pub fn insert_field(&mut self, path: FieldPath, parser: ValueParser) {
        self.by_field.retain(|(existing, _)| *existing != path);
        self.by_field.push((path, parser));
    }

    pub fn for_type(&self, declared: &DeclaredType) -> Option<ValueParser> {
        self.by_type
            .iter()
            .find(|(existing, _)| existing == declared)
            .map(|(_, parser)| *parser)
    }

    /// Parser attached to a field, by path first and then by the field's
    /// own definition.
    pub fn for_field(&self, path: &FieldPath, field: &FieldDefinition) -> Option<ValueParser> {
        self.by_field
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, parser)| *parser)
            .or_else(|| field.value_parser())
    }
}
