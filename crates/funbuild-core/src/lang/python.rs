//! Python plugin source extraction.
//!
//! Python sources are scanned line by line. Import lines are collected
//! separately, `def` headers contribute function names, and everything else
//! before the `if __name__` guard is kept as one block of body content.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, error, info};

use super::Extractor;
use super::patterns::python_function_name;
use crate::dialect::{Dialect, FUNPPY_IMPORT};
use crate::error::{BuildError, Result};
use crate::unit::ExtractedUnit;

/// Lines starting with this end the extracted region.
pub const ENTRY_POINT_GUARD: &str = "if __name__";

/// Line-oriented extractor for Python plugin sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonExtractor;

/// Accumulates one pass over the source lines.
struct Scanner {
    unit: ExtractedUnit,
    content: String,
}

impl Scanner {
    fn new() -> Self {
        Self {
            unit: ExtractedUnit::new(FUNPPY_IMPORT),
            content: String::new(),
        }
    }

    fn feed(&mut self, line: &str) -> ControlFlow<()> {
        if line.starts_with("import") {
            self.unit.imports.push(line.trim().to_string());
        } else if line.starts_with("from") {
            self.unit.from_imports.push(line.trim().to_string());
        } else if line.starts_with(ENTRY_POINT_GUARD) {
            return ControlFlow::Break(());
        } else {
            if line.starts_with("def") {
                // A header the name pattern rejects is dropped, not kept as content
                let Some(header) = python_function_name().captures(line) else {
                    debug!("Skipping unrecognized function header: {}", line);
                    return ControlFlow::Continue(());
                };
                self.unit.function_names.push(header[1].to_string());
            }
            self.content.push_str(line);
            self.content.push('\n');
        }
        ControlFlow::Continue(())
    }

    fn finish(mut self) -> ExtractedUnit {
        self.unit
            .function_bodies
            .push(self.content.trim_matches('\n').to_string());
        self.unit.ensure_plugin_import();

        debug!(
            imports = self.unit.imports.len(),
            from_imports = self.unit.from_imports.len(),
            functions = self.unit.function_names.len(),
            "Extracted Python declarations"
        );

        self.unit
    }
}

impl PythonExtractor {
    /// Extract imports, function names and the body block from Python source.
    pub fn extract(source: &str) -> ExtractedUnit {
        let mut scanner = Scanner::new();
        for line in source.lines() {
            if scanner.feed(line).is_break() {
                break;
            }
        }
        scanner.finish()
    }

    /// Extract from a buffered reader, stopping at the entry-point guard.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn extract_reader<R: BufRead>(reader: R) -> std::io::Result<ExtractedUnit> {
        let mut scanner = Scanner::new();
        for line in reader.split(b'\n') {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            if scanner.feed(line.strip_suffix('\r').unwrap_or(&*line)).is_break() {
                break;
            }
        }
        Ok(scanner.finish())
    }
}

impl Extractor for PythonExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::Python
    }

    fn extract_source(&self, source: &str) -> ExtractedUnit {
        Self::extract(source)
    }

    fn extract_file(&self, path: &Path) -> Result<ExtractedUnit> {
        info!("start to parse {}", path.display());

        let read_failed = |e: std::io::Error| {
            error!("Failed to read {}: {}", path.display(), e);
            BuildError::read(path, e)
        };

        let file = File::open(path).map_err(read_failed)?;
        Self::extract_reader(BufReader::new(file)).map_err(read_failed)
    }
}
