//! Error types for plugin builds.

use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateError;
use crate::toolchain::ToolchainError;

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while building a plugin wrapper.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The source file extension is neither `.py` nor `.go`.
    #[error("type error, expected .py or .go, got {0:?}")]
    UnsupportedType(PathBuf),

    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dialect template failed to parse or render.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The generated file could not be created, written or flushed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The downstream compiler or environment provisioning failed.
    #[error("toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),
}

impl BuildError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Write {
            path: path.into(),
            source,
        }
    }
}
