//! Error types and path context for attack operations

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder used until a caller attaches the real path
const UNKNOWN_PATH: &str = "<unknown>";

/// Main error type for all attack operations
#[derive(Debug)]
pub enum AttackError {
    /// Failed to load or decode an image
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Scoring needs at least two images
    EmptyGroup {
        /// Number of images actually supplied
        len: usize,
    },

    /// An image in a group differs in size from the first image
    ShapeMismatch {
        /// Position of the offending image in the group
        index: usize,
        /// Dimensions (height, width) of the first image
        expected: (usize, usize),
        /// Dimensions (height, width) of the offending image
        found: (usize, usize),
    },

    /// A named column is not present in the table
    MissingColumn {
        /// Requested column
        column: String,
        /// Columns the table does have
        available: Vec<String>,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Reading or writing a parquet file failed
    Table {
        /// Path of the parquet file
        path: PathBuf,
        /// Underlying parquet error
        source: ParquetError,
    },

    /// An in-memory columnar operation failed
    Columnar {
        /// Name of the operation that failed
        operation: &'static str,
        /// Underlying arrow error
        source: ArrowError,
    },

    /// HTTP transport failure while talking to an external service
    Http {
        /// Requested URL
        url: String,
        /// Underlying transport error
        source: reqwest::Error,
    },

    /// The image generation service rejected or failed a request
    Generation {
        /// Prompt of the failed request
        prompt: String,
        /// Seed of the failed request
        seed: u64,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for AttackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::EmptyGroup { len } => {
                write!(f, "Image group needs at least 2 images, got {len}")
            }
            Self::ShapeMismatch {
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Image {index} has shape {}x{}, expected {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            Self::MissingColumn { column, available } => {
                write!(
                    f,
                    "Column '{column}' does not exist (available: {})",
                    available.join(", ")
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Table { path, source } => {
                write!(f, "Parquet error on '{}': {source}", path.display())
            }
            Self::Columnar { operation, source } => {
                write!(f, "Columnar error in {operation}: {source}")
            }
            Self::Http { url, source } => {
                write!(f, "HTTP request to '{url}' failed: {source}")
            }
            Self::Generation {
                prompt,
                seed,
                reason,
            } => {
                write!(f, "Generation failed for seed {seed} of '{prompt}': {reason}")
            }
        }
    }
}

impl std::error::Error for AttackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Table { source, .. } => Some(source),
            Self::Columnar { source, .. } => Some(source),
            Self::Http { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for attack results
pub type Result<T> = std::result::Result<T, AttackError>;

/// Attaches the real file path to errors converted without one
pub trait WithPath<T> {
    /// Replace an unknown path in the error with `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithPath<T> for std::result::Result<T, E>
where
    E: Into<AttackError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                AttackError::ImageLoad { path: p, .. }
                | AttackError::ImageExport { path: p, .. }
                | AttackError::FileSystem { path: p, .. }
                | AttackError::Table { path: p, .. } => {
                    if p.as_os_str() == UNKNOWN_PATH {
                        *p = path.to_path_buf();
                    }
                }
                _ => {}
            }
            error
        })
    }
}

impl From<image::ImageError> for AttackError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for AttackError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<ParquetError> for AttackError {
    fn from(err: ParquetError) -> Self {
        Self::Table {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<ArrowError> for AttackError {
    fn from(err: ArrowError) -> Self {
        Self::Columnar {
            operation: "unknown",
            source: err,
        }
    }
}

impl From<reqwest::Error> for AttackError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            url: err.url().map(ToString::to_string).unwrap_or_default(),
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AttackError {
    AttackError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a columnar operation error
pub const fn columnar_error(operation: &'static str, source: ArrowError) -> AttackError {
    AttackError::Columnar { operation, source }
}
