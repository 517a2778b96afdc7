//! funbuild-core: plugin source extraction and wrapper synthesis
//!
//! This crate turns a user-written Go or Python plugin source into a
//! generated wrapper that registers its functions with funplugin:
//! - Dialect detection from the file extension
//! - Pattern-based extraction of imports, function names and bodies
//! - Template rendering of the wrapper file
//! - Orchestration of the downstream Go build or Python environment

pub mod build;
pub mod dialect;
pub mod error;
pub mod lang;
pub mod synth;
pub mod template;
pub mod toolchain;
pub mod unit;

pub use build::{BuildOptions, BuildOutcome, PluginBuilder, extract, resolve_output};
pub use dialect::Dialect;
pub use error::{BuildError, Result};
pub use lang::{Extractor, GoExtractor, PythonExtractor};
pub use template::{Context, Template, TemplateError, Value};
pub use toolchain::{
    EnvironmentProvisioner, GoToolchain, PluginToolchain, PythonVenv, ToolchainError,
};
pub use unit::ExtractedUnit;
