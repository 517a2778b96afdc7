//! Plugin source dialects.
//!
//! A dialect ties together the file extension, the extractor that scans the
//! source, the plugin-helper import the wrapper needs, and the fixed template
//! the wrapper is rendered from. The dialect is chosen once, from the file
//! extension, and everything downstream follows from it.

use std::path::Path;

use crate::lang::{Extractor, GoExtractor, PythonExtractor};

/// Helper import injected into generated Go wrappers.
pub const FUNGO_IMPORT: &str = r#""github.com/httprunner/funplugin/fungo""#;

/// Helper import injected into generated Python wrappers.
pub const FUNPPY_IMPORT: &str = "import funppy";

/// Python package that provides [`FUNPPY_IMPORT`].
pub const FUNPPY_PACKAGE: &str = "funppy";

const GO_TEMPLATE: &str = include_str!("../templates/debugtalk_go.tmpl");
const PYTHON_TEMPLATE: &str = include_str!("../templates/debugtalk_py.tmpl");

/// Supported plugin source dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Statically typed, compiled into a plugin binary.
    Go,
    /// Dynamically typed, run from a provisioned environment.
    Python,
}

impl Dialect {
    /// Detect the dialect from a file extension (without the dot).
    ///
    /// Matching is exact: `Go` and `PY` are not recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "go" => Some(Dialect::Go),
            "py" => Some(Dialect::Python),
            _ => None,
        }
    }

    /// Detect the dialect from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The import the generated wrapper must contain.
    pub fn plugin_import(&self) -> &'static str {
        match self {
            Dialect::Go => FUNGO_IMPORT,
            Dialect::Python => FUNPPY_IMPORT,
        }
    }

    /// Source of the wrapper template for this dialect.
    pub fn template_source(&self) -> &'static str {
        match self {
            Dialect::Go => GO_TEMPLATE,
            Dialect::Python => PYTHON_TEMPLATE,
        }
    }

    /// The extractor for this dialect.
    pub fn extractor(&self) -> &'static dyn Extractor {
        match self {
            Dialect::Go => &GoExtractor,
            Dialect::Python => &PythonExtractor,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Go => "Go",
            Dialect::Python => "Python",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
