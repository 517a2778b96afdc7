//! Downstream build collaborators.
//!
//! The orchestrator only sees the [`PluginToolchain`] and
//! [`EnvironmentProvisioner`] traits. The implementations here shell out to
//! the `go` command and to a Python virtual environment.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

/// Result type alias for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;

/// Errors raised by external build steps.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The program could not be started at all.
    #[error("{program} not installed: {source}")]
    NotInstalled {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Filesystem failure while preparing the environment.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiles a generated Go wrapper into a plugin binary.
pub trait PluginToolchain {
    /// Confirm the toolchain can be run.
    fn check_available(&self) -> Result<()>;

    /// Resolve dependencies in `plugin_dir` and compile its wrapper to `output`.
    ///
    /// Returns the path of the produced artifact.
    fn resolve_and_build(&self, plugin_dir: &Path, output: &Path) -> Result<PathBuf>;
}

/// Ensures a runtime environment with the plugin helper package exists.
pub trait EnvironmentProvisioner {
    /// Ensure `package` is importable; returns the environment's interpreter.
    fn ensure_environment(&self, package: &str) -> Result<PathBuf>;
}

/// Run `cmd` inside `dir`, capturing its output.
///
/// Stdout is logged at debug level; a non-zero exit becomes
/// [`ToolchainError::CommandFailed`] carrying stderr.
pub fn run_in_dir(mut cmd: Command, dir: &Path) -> Result<String> {
    cmd.current_dir(dir);
    let rendered = render_command(&cmd);
    info!("exec command: {} (in {})", rendered, dir.display());

    let output = cmd.output().map_err(|e| ToolchainError::NotInstalled {
        program: cmd.get_program().to_string_lossy().to_string(),
        source: e,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !stdout.trim().is_empty() {
        debug!("{}", stdout.trim_end());
    }

    if !output.status.success() {
        return Err(ToolchainError::CommandFailed {
            command: rendered,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(stdout)
}

fn render_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Go module path of the plugin helper.
pub const FUNPLUGIN_MODULE: &str = "github.com/httprunner/funplugin";

/// funplugin release the generated wrappers are built against.
pub const FUNPLUGIN_VERSION: &str = "v0.5.4";

/// Builds Go plugins with the `go` command.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    /// The `go` executable.
    pub program: String,
    /// Module path of the plugin helper.
    pub funplugin_module: String,
    /// Pinned helper version.
    pub funplugin_version: String,
    /// File name of the generated wrapper inside the plugin directory.
    pub source_name: String,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            funplugin_module: FUNPLUGIN_MODULE.to_string(),
            funplugin_version: FUNPLUGIN_VERSION.to_string(),
            source_name: crate::build::GO_SOURCE_NAME.to_string(),
        }
    }
}

impl GoToolchain {
    fn go(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }

    /// The pinned `module@version` dependency.
    pub fn funplugin_dependency(&self) -> String {
        format!("{}@{}", self.funplugin_module, self.funplugin_version)
    }
}

impl PluginToolchain for GoToolchain {
    fn check_available(&self) -> Result<()> {
        let dir = std::env::temp_dir();
        let version = run_in_dir(self.go(&["version"]), &dir)?;
        debug!("Using {}", version.trim());
        Ok(())
    }

    fn resolve_and_build(&self, plugin_dir: &Path, output: &Path) -> Result<PathBuf> {
        run_in_dir(self.go(&["mod", "init", "plugin"]), plugin_dir)?;

        let dependency = self.funplugin_dependency();
        run_in_dir(self.go(&["get", &dependency]), plugin_dir)?;

        let mut build = self.go(&["build", "-o"]);
        build.arg(output).arg(&self.source_name);
        run_in_dir(build, plugin_dir)?;

        Ok(output.to_path_buf())
    }
}

/// Provisions a Python virtual environment with pip.
#[derive(Debug, Clone)]
pub struct PythonVenv {
    /// Interpreter used to create the environment.
    pub interpreter: String,
    /// Location of the environment.
    pub venv_dir: PathBuf,
    /// Optional pinned package version.
    pub package_version: Option<String>,
}

impl PythonVenv {
    pub fn new(venv_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: "python3".to_string(),
            venv_dir: venv_dir.into(),
            package_version: None,
        }
    }

    /// Path of the interpreter inside the environment.
    pub fn venv_python(&self) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir.join("Scripts").join("python.exe")
        } else {
            self.venv_dir.join("bin").join("python3")
        }
    }

    fn requirement(&self, package: &str) -> String {
        match &self.package_version {
            Some(version) => format!("{package}=={version}"),
            None => package.to_string(),
        }
    }

    fn pip(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(self.venv_python());
        cmd.args(["-m", "pip"]).args(args);
        cmd
    }
}

impl EnvironmentProvisioner for PythonVenv {
    fn ensure_environment(&self, package: &str) -> Result<PathBuf> {
        // Commands run inside the venv's parent, so a relative location would
        // be resolved twice
        let venv = PythonVenv {
            venv_dir: std::path::absolute(&self.venv_dir)?,
            ..self.clone()
        };
        let python = venv.venv_python();
        let work_dir = venv
            .venv_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);

        if !python.exists() {
            info!("create python3 venv at {}", venv.venv_dir.display());
            std::fs::create_dir_all(&work_dir)?;
            let mut create = Command::new(&venv.interpreter);
            create.args(["-m", "venv"]).arg(&venv.venv_dir);
            run_in_dir(create, &work_dir)?;
        }

        if run_in_dir(venv.pip(&["show", package]), &work_dir).is_ok() {
            debug!("{} already installed in {}", package, venv.venv_dir.display());
            return Ok(python);
        }

        let requirement = venv.requirement(package);
        info!("installing {} into {}", requirement, venv.venv_dir.display());
        run_in_dir(venv.pip(&["install", &requirement]), &work_dir)?;

        Ok(python)
    }
}
