//! funbuild: build funplugin wrappers from plugin sources
//!
//! Reads a Go or Python plugin source, generates the wrapper that registers
//! its functions with funplugin, and then compiles it (Go) or provisions a
//! Python environment for it.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use funbuild_core::PluginBuilder;

/// Build funplugin wrappers from Go and Python plugin sources
#[derive(Parser)]
#[command(name = "funbuild")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to .funbuild directory (default: search for .funbuild/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the wrapper for a .go or .py plugin and build it
    Build {
        /// Plugin source file (.go or .py)
        file: PathBuf,

        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the declarations extracted from a plugin source as JSON
    Inspect {
        /// Plugin source file (.go or .py)
        file: PathBuf,
    },

    /// Initialize a new .funbuild directory with config file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Open a daily-rotated log file writer, or `None` if the directory is unusable.
fn file_writer(log_dir: &Path) -> Option<NonBlocking> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "funbuild.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard would stop the background writer
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    Some(non_blocking)
}

/// Initialize logging to stderr, plus a log file when `log_dir` is set.
fn init_logging(verbose: bool, log_dir: Option<&Path>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_layer = log_dir
        .and_then(file_writer)
        .map(|writer| fmt::layer().with_writer(writer).with_ansi(false));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
}

/// Load config from an explicit `.funbuild` path or auto-discover it.
///
/// Returns the config and the `.funbuild` directory it came from.
fn load_config(override_path: Option<&PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = override_path {
        let config_file = if path.is_dir() {
            path.join(config::CONFIG_FILE)
        } else {
            path.clone()
        };
        let funbuild_dir = config_file.parent().unwrap_or(path).to_path_buf();
        let config = Config::from_file(&config_file)?;
        return Ok((config, Some(funbuild_dir)));
    }

    match Config::find_and_load()? {
        Some((config, funbuild_dir)) => Ok((config, Some(funbuild_dir))),
        None => Ok((Config::default(), None)),
    }
}

fn run_build(
    config: &Config,
    funbuild_dir: Option<&Path>,
    file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let toolchain = config.go_toolchain();
    let venv = config.python_venv(funbuild_dir);

    let outcome = PluginBuilder::new(&toolchain, &venv)
        .with_options(config.build_options())
        .build(file, output)?;

    info!(
        "{} plugin {} built at {}",
        outcome.dialect,
        file.display(),
        outcome.output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_dir) = load_config(cli.config.as_ref())?;
    init_logging(
        cli.verbose,
        config.log_dir(config_dir.as_deref()).as_deref(),
    );

    match &config_dir {
        Some(dir) => info!("Loaded config from {}", dir.display()),
        None => tracing::debug!("No .funbuild/config.toml found, using defaults"),
    }

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            error!("Invalid config: {}", problem);
        }
        anyhow::bail!("configuration has {} error(s)", problems.len());
    }

    match cli.command {
        Commands::Build { file, output } => {
            if let Err(e) = run_build(&config, config_dir.as_deref(), &file, output.as_deref()) {
                error!("failed to build {}: {:#}", file.display(), e);
                std::process::exit(1);
            }
        }

        Commands::Inspect { file } => {
            let (dialect, unit) = funbuild_core::extract(&file)?;
            let report = serde_json::json!({
                "dialect": dialect.name(),
                "unit": unit,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Init { force } => {
            use config::{CONFIG_FILE, FUNBUILD_DIR};

            let funbuild_dir = PathBuf::from(FUNBUILD_DIR);
            let config_path = funbuild_dir.join(CONFIG_FILE);

            if config_path.exists() && !force {
                anyhow::bail!(".funbuild/config.toml already exists. Use --force to overwrite.");
            }

            if !funbuild_dir.exists() {
                std::fs::create_dir_all(&funbuild_dir)?;
                info!("Created {}/", funbuild_dir.display());
            }

            std::fs::write(&config_path, config::DEFAULT_CONFIG)?;
            info!("Created {}", config_path.display());
            info!("Next steps:");
            info!("  1. Edit .funbuild/config.toml to pin the funplugin version");
            info!("  2. Run 'funbuild build debugtalk.go' or 'funbuild build debugtalk.py'");
        }
    }

    Ok(())
}
