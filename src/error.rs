//! Error types for saving, loading and fitting.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PersistError>;

/// Error type for persistence and estimator operations.
#[derive(Debug)]
pub enum PersistError {
    /// The value (or something nested in it) cannot be represented by the encoding.
    EncodingUnsupported { type_name: String, reason: String },
    /// The bytes are not a valid artifact.
    CorruptArtifact(String),
    /// Stored and recomputed CRC32 differ.
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Artifact was written by an unknown format version.
    UnsupportedVersion { found: u16, supported: u16 },
    /// Artifact holds a different Rust type than the one requested.
    TypeMismatch { expected: String, found: String },
    /// Artifact exceeds the configured load limit.
    ArtifactTooLarge { size: u64, limit: u64 },
    /// I/O error while reading or writing an artifact.
    Io(std::io::Error),
    /// Invalid data passed to an estimator.
    InvalidInput(String),
    /// Feature dimension mismatch.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// The normal equations have no unique solution.
    SingularMatrix,
    /// Dataset could not be read or parsed.
    Dataset(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::EncodingUnsupported { type_name, reason } => {
                write!(f, "Encoding unsupported for {}: {}", type_name, reason)
            }
            PersistError::CorruptArtifact(msg) => {
                write!(f, "Corrupt artifact: {}", msg)
            }
            PersistError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "Checksum mismatch: stored {:#010x}, computed {:#010x}",
                    expected, actual
                )
            }
            PersistError::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Unsupported artifact version {} (this build reads version {})",
                    found, supported
                )
            }
            PersistError::TypeMismatch { expected, found } => {
                write!(
                    f,
                    "Type mismatch: artifact holds {}, expected {}",
                    found, expected
                )
            }
            PersistError::ArtifactTooLarge { size, limit } => {
                write!(
                    f,
                    "Artifact too large: {} bytes exceeds limit of {} bytes",
                    size, limit
                )
            }
            PersistError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            PersistError::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            PersistError::FeatureMismatch {
                expected_features,
                got_features,
            } => {
                write!(
                    f,
                    "Feature mismatch: expected {} features, got {}",
                    expected_features, got_features
                )
            }
            PersistError::SingularMatrix => {
                write!(f, "Singular matrix: normal equations are not positive definite")
            }
            PersistError::Dataset(msg) => {
                write!(f, "Dataset error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl PersistError {
    /// True for every failure caused by the artifact bytes themselves.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            PersistError::CorruptArtifact(_)
                | PersistError::ChecksumMismatch { .. }
                | PersistError::UnsupportedVersion { .. }
        )
    }
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::Io(err)
    }
}

impl From<csv::Error> for PersistError {
    fn from(err: csv::Error) -> Self {
        PersistError::Dataset(err.to_string())
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::CorruptArtifact(format!("metadata: {}", err))
    }
}
