//! Error types for Ponderar operations.
//!
//! Provides explicit failure signaling for configuration, lifecycle,
//! persistence, and training-data problems.

use std::fmt;

/// Main error type for Ponderar operations.
///
/// Covers four failure classes: invalid hyperparameters, out-of-order
/// lifecycle usage, malformed persisted snapshots, and degenerate
/// training data.
///
/// # Examples
///
/// ```
/// use ponderar::error::PonderarError;
///
/// let err = PonderarError::InvalidHyperparameter {
///     param: "max_iterations".to_string(),
///     value: "0".to_string(),
///     constraint: ">= 1".to_string(),
/// };
/// assert!(err.to_string().contains("max_iterations"));
/// ```
#[derive(Debug)]
pub enum PonderarError {
    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Prediction or export requested before any learning or import.
    NotTrained,

    /// Learning requested on an instance holding an imported snapshot.
    AlreadyImported,

    /// Raw-mode learning requested without a configured feature extractor.
    MissingFeatureExtractor,

    /// Training data contained fewer than two distinct class labels.
    InsufficientClasses {
        /// Distinct labels observed
        found: usize,
    },

    /// Export requested with no trained model to serialize.
    NothingToExport,

    /// Import payload was empty.
    EmptySnapshot,

    /// Serialization/deserialization error.
    Serialization(String),

    /// Import payload parsed but did not match the snapshot layout.
    SnapshotFormat {
        /// Error description
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for PonderarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PonderarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            PonderarError::NotTrained => {
                write!(f, "No learning or import has occurred")
            }
            PonderarError::AlreadyImported => {
                write!(
                    f,
                    "Learning is not permitted on an imported model; reset first"
                )
            }
            PonderarError::MissingFeatureExtractor => {
                write!(f, "No feature extractor has been configured")
            }
            PonderarError::InsufficientClasses { found } => {
                write!(f, "Can not learn from fewer than 2 classes, found {found}")
            }
            PonderarError::NothingToExport => write!(f, "Nothing to export: no training has occurred"),
            PonderarError::EmptySnapshot => write!(f, "Snapshot payload is empty"),
            PonderarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            PonderarError::SnapshotFormat { message } => {
                write!(f, "Invalid snapshot format: {message}")
            }
            PonderarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PonderarError {}

impl From<&str> for PonderarError {
    fn from(msg: &str) -> Self {
        PonderarError::Other(msg.to_string())
    }
}

impl From<String> for PonderarError {
    fn from(msg: String) -> Self {
        PonderarError::Other(msg)
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for PonderarError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<PonderarError> for &str {
    fn eq(&self, other: &PonderarError) -> bool {
        *self == other.to_string()
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, PonderarError>;
