//! Custom error types for `marsconv` operations.
//!
//! This module provides structured error handling using `thiserror`,
//! separating the fatal pre-flight class (bad parameters, missing source,
//! schema/creation failures) from the per-record class that the conversion
//! loop contains and reports as warnings.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `marsconv` operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum MarsconvError {
    /// Configuration errors (invalid direction token, bad options)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O errors (file read/write, path issues, permissions)
    #[error(transparent)]
    Io(#[from] IoError),

    /// Format parsing, schema, and geometry errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Generic errors from dependencies
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration errors.
///
/// These errors occur when options or parameters are invalid. They are
/// always fatal and are raised before any dataset I/O is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Required option is missing
    #[error("Missing required option: {option}")]
    MissingRequired {
        /// The missing option name
        option: String,
    },
}

/// I/O related errors.
///
/// These errors occur during dataset file operations, including reading,
/// writing, and path validation.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "`GeoJSON`")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Path is invalid
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// Why the path is invalid
        reason: String,
    },

    /// Source dataset was not found
    #[error("Source dataset not found: '{path}'")]
    FileNotFound {
        /// The missing dataset path
        path: PathBuf,
    },
}

/// Format parsing and validation errors.
///
/// These occur when decoding a dataset or walking a record's geometry. When
/// raised for a single record inside the conversion loop they are contained
/// and the record is skipped; during schema introspection or dataset
/// creation they are fatal.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Failed to parse a dataset
    #[error("Failed to parse {format}: {message}")]
    Parse {
        /// The format being parsed
        format: String,
        /// Description of the parse error
        message: String,
    },

    /// Schema inference or replication failed
    #[error("Schema error for {format}: {reason}")]
    SchemaInference {
        /// The format
        format: String,
        /// Why schema handling failed
        reason: String,
    },

    /// Invalid geometry on a single record
    #[error("Invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of the geometry problem
        message: String,
    },

    /// Unsupported geometry type
    #[error("Unsupported geometry type: {geometry_type}")]
    UnsupportedGeometryType {
        /// The unsupported geometry type
        geometry_type: String,
    },
}

/// Type alias for Results using [`MarsconvError`].
pub type Result<T> = std::result::Result<T, MarsconvError>;

impl MarsconvError {
    /// Get a user-friendly error message with context.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Io(e) => e.user_message(),
            Self::Format(e) => e.to_string(),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    ///
    /// Returns helpful suggestions on how to fix or work around the error.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Config(ConfigError::InvalidOption { option, .. }) if option == "direction" => {
                Some(
                    "Pass --direction WGS84_TO_GCJ02 or --direction GCJ02_TO_WGS84.".to_string(),
                )
            },
            Self::Io(e) => e.recovery_suggestion(),
            Self::Format(FormatError::Parse { .. }) => {
                Some("Check the file format and ensure it's valid.".to_string())
            },
            _ => None,
        }
    }

    /// Check if this error belongs to the per-record class.
    ///
    /// Per-record errors are contained by the conversion loop: the offending
    /// record is skipped with a warning and processing continues.
    #[must_use]
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            Self::Format(
                FormatError::InvalidGeometry { .. } | FormatError::UnsupportedGeometryType { .. }
            )
        )
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("Source dataset not found: {}", path.display())
            },
            Self::InvalidPath { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the input path is correct and the dataset exists.".to_string())
            },
            Self::Write { .. } => {
                Some("Check that the output directory exists and is writable.".to_string())
            },
            Self::InvalidPath { .. } => {
                Some("Ensure the path is valid and properly formatted.".to_string())
            },
            Self::Read { .. } => None,
        }
    }
}

/// Extension trait for adding I/O context to errors.
///
/// This trait provides convenient methods to wrap errors with file and format
/// context, creating more informative error messages.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            MarsconvError::Io(IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            MarsconvError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}
