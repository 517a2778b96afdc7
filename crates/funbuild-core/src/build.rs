//! Plugin build orchestration.
//!
//! Picks the dialect from the source extension, runs its extractor, renders
//! the wrapper and hands the result to the downstream toolchain.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::dialect::{Dialect, FUNPPY_PACKAGE};
use crate::error::{BuildError, Result};
use crate::synth;
use crate::template::Template;
use crate::toolchain::{EnvironmentProvisioner, PluginToolchain};
use crate::unit::ExtractedUnit;

/// File name of the generated Go wrapper inside the plugin directory.
pub const GO_SOURCE_NAME: &str = "debugtalk.go";
/// Default file name of the compiled Go plugin.
pub const GO_ARTIFACT_NAME: &str = "debugtalk.bin";
/// Default file name of the generated Python wrapper.
pub const PYTHON_SCRIPT_NAME: &str = "debugtalk_gen.py";

/// Tunables for a build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Artifact file name used when the output is a directory or unset.
    pub go_artifact_name: String,
    /// Script file name used when the output is a directory or unset.
    pub python_script_name: String,
    /// Keep the temporary Go plugin directory after the build.
    pub keep_workspace: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            go_artifact_name: GO_ARTIFACT_NAME.to_string(),
            python_script_name: PYTHON_SCRIPT_NAME.to_string(),
            keep_workspace: false,
        }
    }
}

/// What a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub dialect: Dialect,
    /// The declarations that went into the wrapper.
    pub unit: ExtractedUnit,
    /// The generated wrapper source. For Go this lives in a temporary
    /// directory that is removed unless `keep_workspace` is set.
    pub generated: PathBuf,
    /// The final artifact: the plugin binary for Go, the wrapper for Python.
    pub output: PathBuf,
}

/// Resolve the user-supplied output path.
///
/// Unset or empty means `default_name` in the current directory; an existing
/// directory gets `default_name` appended; anything else is used as given.
pub fn resolve_output(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) if path.as_os_str().is_empty() => {
            std::env::current_dir().unwrap_or_default().join(default_name)
        }
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_default().join(default_name),
    }
}

/// Parse the fixed wrapper template for a dialect.
pub fn dialect_template(dialect: Dialect) -> Result<Template> {
    Template::parse(dialect.name(), dialect.template_source()).map_err(|e| {
        error!("Invalid {} template: {}", dialect, e);
        BuildError::Template(e)
    })
}

/// Detect the dialect of `source` and extract its declarations.
pub fn extract(source: &Path) -> Result<(Dialect, ExtractedUnit)> {
    let dialect = detect(source)?;
    let unit = dialect.extractor().extract_file(source)?;
    Ok((dialect, unit))
}

fn detect(source: &Path) -> Result<Dialect> {
    Dialect::from_path(source).ok_or_else(|| {
        error!("type error, expected .py or .go: {}", source.display());
        BuildError::UnsupportedType(source.to_path_buf())
    })
}

/// Coordinates extraction, synthesis and the downstream build.
pub struct PluginBuilder<'a> {
    toolchain: &'a dyn PluginToolchain,
    provisioner: &'a dyn EnvironmentProvisioner,
    options: BuildOptions,
}

impl<'a> PluginBuilder<'a> {
    pub fn new(
        toolchain: &'a dyn PluginToolchain,
        provisioner: &'a dyn EnvironmentProvisioner,
    ) -> Self {
        Self {
            toolchain,
            provisioner,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the plugin for `source`, writing to `output` (see [`resolve_output`]).
    pub fn build(&self, source: &Path, output: Option<&Path>) -> Result<BuildOutcome> {
        match detect(source)? {
            Dialect::Go => self.build_go(source, output),
            Dialect::Python => self.build_python(source, output),
        }
    }

    fn build_go(&self, source: &Path, output: Option<&Path>) -> Result<BuildOutcome> {
        self.toolchain.check_available().map_err(|e| {
            error!("go sdk not installed: {}", e);
            BuildError::Toolchain(e)
        })?;

        let workspace = tempfile::Builder::new()
            .prefix("funbuild_")
            .disable_cleanup(self.options.keep_workspace)
            .tempdir()
            .map_err(|e| BuildError::write(std::env::temp_dir(), e))?;
        let plugin_dir = workspace.path().join("plugin");
        std::fs::create_dir_all(&plugin_dir).map_err(|e| BuildError::write(&plugin_dir, e))?;

        let unit = Dialect::Go.extractor().extract_file(source)?;
        let generated = plugin_dir.join(GO_SOURCE_NAME);
        synth::generate(&generated, &dialect_template(Dialect::Go)?, &unit)?;

        let output = resolve_output(output, &self.options.go_artifact_name);
        let output = std::path::absolute(&output).map_err(|e| BuildError::write(&output, e))?;

        let artifact = self.toolchain.resolve_and_build(&plugin_dir, &output)?;
        info!(
            "build {} to {} successfully",
            source.display(),
            artifact.display()
        );

        Ok(BuildOutcome {
            dialect: Dialect::Go,
            unit,
            generated,
            output: artifact,
        })
    }

    fn build_python(&self, source: &Path, output: Option<&Path>) -> Result<BuildOutcome> {
        let unit = Dialect::Python.extractor().extract_file(source)?;

        let output = resolve_output(output, &self.options.python_script_name);
        synth::generate(&output, &dialect_template(Dialect::Python)?, &unit)?;

        let python = self.provisioner.ensure_environment(FUNPPY_PACKAGE)?;
        debug!("{} available via {}", FUNPPY_PACKAGE, python.display());
        info!(
            "build {} to {} successfully",
            source.display(),
            output.display()
        );

        Ok(BuildOutcome {
            dialect: Dialect::Python,
            unit,
            generated: output.clone(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_explicit_file() {
        let path = Path::new("/some/where/plugin.bin");
        assert_eq!(
            resolve_output(Some(path), GO_ARTIFACT_NAME),
            PathBuf::from("/some/where/plugin.bin")
        );
    }

    #[test]
    fn test_resolve_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_output(Some(dir.path()), PYTHON_SCRIPT_NAME),
            dir.path().join(PYTHON_SCRIPT_NAME)
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_resolve_output_defaults_to_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            resolve_output(None, GO_ARTIFACT_NAME),
            cwd.join(GO_ARTIFACT_NAME)
        );
        assert_eq!(
            resolve_output(Some(Path::new("")), GO_ARTIFACT_NAME),
            cwd.join(GO_ARTIFACT_NAME)
        );
    }

    #[test]
    fn test_extract_rejects_unknown_extension() {
        let err = extract(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedType(_)));
    }

    #[test]
    fn test_dialect_templates_parse() {
        assert_eq!(dialect_template(Dialect::Go).unwrap().name(), "Go");
        assert_eq!(dialect_template(Dialect::Python).unwrap().name(), "Python");
    }
}
