//! Error types for discovery and launch synthesis.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while discovering tests or building a launch.
#[derive(Debug, Error)]
pub enum LensError {
    /// No project manifest was found above the source file.
    #[error(
        "can't find the root of the project for {}, last tried {}",
        file.display(),
        last_tried.display()
    )]
    ProjectRootNotFound { file: PathBuf, last_tried: PathBuf },

    /// A declaration kind outside of suite/test reached the core.
    #[error("Invalid test declaration kind: {0:?}")]
    InvalidKind(String),

    /// A command argument could not be decoded.
    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),

    /// No handler is registered for the command id.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The source could not be parsed into a syntax tree.
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LensError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LensError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        LensError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T, E = LensError> = std::result::Result<T, E>;
