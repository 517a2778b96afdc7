//! Configuration file support for funbuild.
//!
//! Settings live in `.funbuild/config.toml`, discovered by searching the
//! current directory and then each parent. Every field has a default, so a
//! missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use funbuild_core::build::{GO_ARTIFACT_NAME, GO_SOURCE_NAME, PYTHON_SCRIPT_NAME};
use funbuild_core::toolchain::{FUNPLUGIN_MODULE, FUNPLUGIN_VERSION};
use funbuild_core::{BuildOptions, GoToolchain, PythonVenv};

/// The funbuild data directory name.
pub const FUNBUILD_DIR: &str = ".funbuild";
/// The config file name within the funbuild directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Go plugin settings.
    pub go: GoConfig,
    /// Python plugin settings.
    pub python: PythonConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Go toolchain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoConfig {
    /// The `go` executable.
    pub program: String,
    /// funplugin release to build against.
    pub funplugin_version: String,
    /// Artifact name used when the output is a directory or unset.
    pub artifact_name: String,
    /// Keep the temporary plugin directory for inspection.
    pub keep_workspace: bool,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            funplugin_version: FUNPLUGIN_VERSION.to_string(),
            artifact_name: GO_ARTIFACT_NAME.to_string(),
            keep_workspace: false,
        }
    }
}

/// Python environment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Interpreter used to create the virtual environment.
    pub interpreter: String,
    /// Virtual environment location (default: `~/.funbuild/venv`).
    pub venv_dir: Option<PathBuf>,
    /// Pinned funppy version, if any.
    pub package_version: Option<String>,
    /// Script name used when the output is a directory or unset.
    pub script_name: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            venv_dir: None,
            package_version: None,
            script_name: PYTHON_SCRIPT_NAME.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write daily-rotated logs to `.funbuild/logs/`.
    pub file: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Find and load configuration from current or parent directories.
    pub fn find_and_load() -> Result<Option<(Self, PathBuf)>> {
        let current = std::env::current_dir()?;
        Self::find_and_load_from(&current)
    }

    /// Find and load configuration starting from a specific directory.
    ///
    /// Returns the config together with its `.funbuild` directory.
    pub fn find_and_load_from(start: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start.to_path_buf();

        loop {
            let funbuild_dir = dir.join(FUNBUILD_DIR);
            let config_path = funbuild_dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                return Ok(Some((config, funbuild_dir)));
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Build options derived from the output settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            go_artifact_name: self.go.artifact_name.clone(),
            python_script_name: self.python.script_name.clone(),
            keep_workspace: self.go.keep_workspace,
        }
    }

    /// The Go toolchain described by `[go]`.
    pub fn go_toolchain(&self) -> GoToolchain {
        GoToolchain {
            program: self.go.program.clone(),
            funplugin_module: FUNPLUGIN_MODULE.to_string(),
            funplugin_version: self.go.funplugin_version.clone(),
            source_name: GO_SOURCE_NAME.to_string(),
        }
    }

    /// The Python environment described by `[python]`.
    ///
    /// A relative `venv_dir` is resolved against the `.funbuild` directory
    /// when one is known.
    pub fn python_venv(&self, funbuild_dir: Option<&Path>) -> PythonVenv {
        let venv_dir = match (&self.python.venv_dir, funbuild_dir) {
            (Some(dir), Some(base)) if dir.is_relative() => base.join(dir),
            (Some(dir), _) => dir.clone(),
            (None, _) => dirs::home_dir()
                .map(|home| home.join(FUNBUILD_DIR))
                .unwrap_or_else(|| PathBuf::from(FUNBUILD_DIR))
                .join("venv"),
        };

        PythonVenv {
            interpreter: self.python.interpreter.clone(),
            venv_dir,
            package_version: self.python.package_version.clone(),
        }
    }

    /// Directory for file logs, relative to the `.funbuild` directory if known.
    pub fn log_dir(&self, funbuild_dir: Option<&Path>) -> Option<PathBuf> {
        if !self.logging.file {
            return None;
        }
        let base = funbuild_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(FUNBUILD_DIR));
        Some(base.join("logs"))
    }
}

/// Configuration validation error.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigValidationError {}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let programs = [
            ("go.program", &self.go.program),
            ("go.funplugin_version", &self.go.funplugin_version),
            ("python.interpreter", &self.python.interpreter),
        ];
        for (field, value) in programs {
            if value.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "Value cannot be empty.".to_string(),
                });
            }
        }

        let file_names = [
            ("go.artifact_name", &self.go.artifact_name),
            ("python.script_name", &self.python.script_name),
        ];
        for (field, name) in file_names {
            if name.is_empty() || name.contains(['/', '\\']) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: format!("Invalid file name '{}'. Expected a bare file name.", name),
                });
            }
        }

        if !self.python.script_name.ends_with(".py") {
            errors.push(ConfigValidationError {
                field: "python.script_name".to_string(),
                message: format!(
                    "Script name '{}' must end with .py.",
                    self.python.script_name
                ),
            });
        }

        errors
    }
}

/// Contents written by `funbuild init`.
pub const DEFAULT_CONFIG: &str = r#"# funbuild configuration

[go]
program = "go"
funplugin_version = "v0.5.4"  # funplugin release the plugin is built against
artifact_name = "debugtalk.bin"
keep_workspace = false  # keep the temporary build directory

[python]
interpreter = "python3"
# venv_dir = "/path/to/venv"  # Default: ~/.funbuild/venv; relative to this directory
# package_version = "0.5.4"   # Pin funppy
script_name = "debugtalk_gen.py"

[logging]
file = false  # Also log to .funbuild/logs/
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.go.program, "go");
        assert_eq!(config.go.artifact_name, "debugtalk.bin");
        assert_eq!(config.python.interpreter, "python3");
        assert_eq!(config.python.script_name, "debugtalk_gen.py");
        assert!(!config.logging.file);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.go.funplugin_version, FUNPLUGIN_VERSION);
        assert_eq!(config.go.artifact_name, GO_ARTIFACT_NAME);
        assert_eq!(config.python.script_name, PYTHON_SCRIPT_NAME);
        assert!(config.python.venv_dir.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[python]
venv_dir = "/opt/funbuild/venv"
package_version = "0.5.4"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.go.program, "go");

        let venv = config.python_venv(Some(Path::new("/project/.funbuild")));
        assert_eq!(venv.venv_dir, PathBuf::from("/opt/funbuild/venv"));
        assert_eq!(venv.package_version.as_deref(), Some("0.5.4"));
    }

    #[test]
    fn test_relative_venv_dir_follows_config_dir() {
        let mut config = Config::default();
        config.python.venv_dir = Some(PathBuf::from("envs/venv"));

        assert_eq!(
            config.python_venv(Some(Path::new("/project/.funbuild"))).venv_dir,
            PathBuf::from("/project/.funbuild/envs/venv")
        );
        assert_eq!(
            config.python_venv(None).venv_dir,
            PathBuf::from("envs/venv")
        );
    }

    #[test]
    fn test_build_options_and_toolchain() {
        let mut config = Config::default();
        config.go.artifact_name = "plugin.bin".to_string();
        config.go.program = "/usr/local/go/bin/go".to_string();
        config.go.keep_workspace = true;

        let options = config.build_options();
        assert_eq!(options.go_artifact_name, "plugin.bin");
        assert!(options.keep_workspace);

        let go = config.go_toolchain();
        assert_eq!(go.program, "/usr/local/go/bin/go");
        assert_eq!(go.source_name, GO_SOURCE_NAME);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut config = Config::default();
        config.go.program = " ".to_string();
        config.python.script_name = "out/debugtalk.py".to_string();

        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "go.program"));
        assert!(errors.iter().any(|e| e.field == "python.script_name"));
    }

    #[test]
    fn test_log_dir() {
        let mut config = Config::default();
        assert!(config.log_dir(None).is_none());

        config.logging.file = true;
        assert_eq!(
            config.log_dir(Some(Path::new("/project/.funbuild"))),
            Some(PathBuf::from("/project/.funbuild/logs"))
        );
        assert_eq!(config.log_dir(None), Some(PathBuf::from(".funbuild/logs")));
    }

    #[test]
    fn test_find_and_load_from_parent() {
        let root = tempfile::tempdir().unwrap();
        let funbuild_dir = root.path().join(FUNBUILD_DIR);
        std::fs::create_dir_all(&funbuild_dir).unwrap();
        std::fs::write(funbuild_dir.join(CONFIG_FILE), "[go]\nprogram = \"go1.22\"\n").unwrap();

        let nested = root.path().join("plugins").join("demo");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, dir) = Config::find_and_load_from(&nested).unwrap().unwrap();
        assert_eq!(config.go.program, "go1.22");
        assert_eq!(dir, funbuild_dir);
    }
}
