//! Error types for dictionary output, profiles and run configuration.

use inflow_fem::MeshError;
use inflow_spectral::SpectralError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or writing inflow dictionaries.
#[derive(Debug, Error)]
pub enum OutputError {
    /// An index does not survive formatting with the configured digits.
    #[error("index {index} cannot be written exactly with {digits} significant digits")]
    IndexPrecision {
        /// Offending index
        index: usize,
        /// Configured significant digits
        digits: usize,
    },

    /// The number of significant digits is unusable.
    #[error("significant digits must be in 1..=17, got {0}")]
    InvalidDigits(usize),

    /// A dictionary block could not be read back.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line of the failure
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The JSON run configuration is malformed.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A terrain category is not tabulated.
    #[error("unknown {kind} category '{name}'")]
    UnknownCategory {
        /// Category table, e.g. "Eurocode"
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// A profile parameter is out of range.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// The spectral synthesis failed.
    #[error("spectral synthesis: {0}")]
    Spectral(#[from] SpectralError),

    /// The patch operators could not be built.
    #[error("patch operators: {0}")]
    Mesh(#[from] MeshError),
}

/// A specialized `Result` type for dictionary operations.
pub type Result<T> = std::result::Result<T, OutputError>;

impl OutputError {
    /// Returns `true` for formatting failures of the numeric output.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            OutputError::IndexPrecision { .. } | OutputError::InvalidDigits(_)
        )
    }

    /// Returns `true` when the caller supplied an invalid configuration or profile.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OutputError::Json(_)
                | OutputError::UnknownCategory { .. }
                | OutputError::InvalidProfile(_)
                | OutputError::Parse { .. }
        ) || matches!(self, OutputError::Spectral(e) if e.is_parameter_error())
            || matches!(self, OutputError::Mesh(e) if e.is_input_error())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}
