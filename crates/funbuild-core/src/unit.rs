//! The extracted unit: everything a wrapper template needs from a source file.

use serde::Serialize;

use crate::template::{Context, Value};

/// Declarations extracted from one plugin source file.
///
/// Built fresh for every build, filled by exactly one extractor and consumed
/// by exactly one synthesizer pass. `function_names` and `function_bodies`
/// come from separate scans and are not cross-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedUnit {
    /// Helper import the generated wrapper must contain.
    pub plugin_import: String,
    /// Import statements in source order.
    pub imports: Vec<String>,
    /// `from ... import ...` statements (Python only).
    pub from_imports: Vec<String>,
    /// Function definition text blocks in source order.
    pub function_bodies: Vec<String>,
    /// Names of the functions to register, in source order.
    pub function_names: Vec<String>,
}

impl ExtractedUnit {
    /// Create an empty unit for the given plugin import.
    pub fn new(plugin_import: impl Into<String>) -> Self {
        Self {
            plugin_import: plugin_import.into(),
            ..Default::default()
        }
    }

    /// Append the plugin import unless it is already present verbatim.
    pub fn ensure_plugin_import(&mut self) {
        if !self.imports.iter().any(|i| i == &self.plugin_import) {
            self.imports.push(self.plugin_import.clone());
        }
    }
}

impl Context for ExtractedUnit {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "plugin_import" => Some(Value::Text(&self.plugin_import)),
            "imports" => Some(Value::List(&self.imports)),
            "from_imports" => Some(Value::List(&self.from_imports)),
            "function_bodies" => Some(Value::List(&self.function_bodies)),
            "function_names" => Some(Value::List(&self.function_names)),
            _ => None,
        }
    }
}
