//! Dialect-specific extractors.
//!
//! Each dialect module scans plugin source text and fills an
//! [`ExtractedUnit`] with its imports, function names and function bodies.

pub mod go;
pub mod patterns;
pub mod python;

use std::path::Path;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::unit::ExtractedUnit;

pub use go::GoExtractor;
pub use python::PythonExtractor;

/// Pulls reusable declarations out of a plugin source file.
///
/// Implementations are pattern based; a real parser can replace one without
/// touching the synthesizer as long as it fills the unit the same way.
pub trait Extractor: Send + Sync {
    /// The dialect this extractor understands.
    fn dialect(&self) -> Dialect;

    /// Extract from in-memory source text.
    fn extract_source(&self, source: &str) -> ExtractedUnit;

    /// Extract from a file, failing with [`BuildError::Read`] if it cannot be read.
    ///
    /// [`BuildError::Read`]: crate::error::BuildError::Read
    fn extract_file(&self, path: &Path) -> Result<ExtractedUnit>;
}
