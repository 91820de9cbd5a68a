use crate::schema::FieldPath;

/// How dotted field paths become long flag names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagNaming {
    pub separator: String,
    pub dash_underscores: bool,
    pub lowercase: bool,
}

impl Default for FlagNaming {
    fn default() -> Self {
        Self {
            separator: "-".to_string(),
            dash_underscores: true,
            lowercase: true,
        }
    }
}

impl FlagNaming {
    /// `a.b_c` becomes `--a-b-c` with the default settings.
    pub fn flag_name(&self, path: &FieldPath) -> String {
        let segments: Vec<String> = path
            .segments()
            .iter()
            .map(|segment| self.normalize(segment))
            .collect();
        format!("--{}", segments.join(&self.separator))
    }

    fn normalize(&self, segment: &str) -> String {
        let dashed = if !self.dash_underscores {
            segment.to_string()
        } else if let Some(rest) = segment.strip_prefix('_') {
            // A leading underscore is part of the name, not a word break.
            format!("_{}", rest.replace('_', "-"))
        } else {
            segment.replace('_', "-")
        };

        if self.lowercase {
            dashed.to_lowercase()
        } else {
            dashed
        }
    }
}
