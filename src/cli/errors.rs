//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::collection::ConfigError;
use crate::index::IndexError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed `--index` or `--where` argument
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data line that is not a usable record
    #[error("line {line}: {reason}")]
    Input { line: usize, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }

    pub(crate) fn input(line: usize, reason: impl Into<String>) -> Self {
        CliError::Input {
            line,
            reason: reason.into(),
        }
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Usage(_) => "INDEXKV_CLI_USAGE",
            CliError::Read { .. } | CliError::Output(_) => "INDEXKV_CLI_IO",
            CliError::Input { .. } => "INDEXKV_CLI_INPUT",
            CliError::Config(_) => "INDEXKV_CLI_CONFIG",
            CliError::Index(err) => err.code(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.into())
    }
}
