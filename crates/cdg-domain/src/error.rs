//! Error handling types

use thiserror::Error;

use crate::value_objects::FailureKind;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the code documentation generator
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// A source file failed to parse; the whole file is skipped
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path of the file that failed to parse
        path: String,
        /// Description of the parse failure
        message: String,
    },

    /// The inference endpoint did not answer within the deadline,
    /// after all retry attempts were exhausted
    #[error("inference timed out for unit {unit} after {attempts} attempts")]
    InferenceTimeout {
        /// Qualified name of the affected unit
        unit: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// The inference endpoint could not be reached at all
    #[error("inference endpoint unreachable: {message}")]
    InferenceUnreachable {
        /// Description of the connection failure
        message: String,
    },

    /// The model completion was rejected by the response validator
    #[error("invalid model response for unit {unit}: {reason}")]
    InvalidResponse {
        /// Qualified name of the affected unit
        unit: String,
        /// Why the completion was rejected
        reason: String,
    },

    /// The merged file no longer matches the original structure;
    /// the on-disk file is left untouched
    #[error("merge verification failed for {path}: {message}")]
    MergeVerification {
        /// Path of the file whose merge was rejected
        path: String,
        /// Description of the structural mismatch
        message: String,
    },

    /// Configuration-related error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error other than timeout/unreachable
    #[error("network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The run was cancelled before this operation could complete
    #[error("run cancelled")]
    Cancelled,
}

impl Error {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unreachable-endpoint error
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::InferenceUnreachable {
            message: message.into(),
        }
    }

    /// Create an invalid-response error for a unit
    pub fn invalid_response(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            unit: unit.into(),
            reason: reason.into(),
        }
    }

    /// Create a merge verification error for a file
    pub fn merge_verification(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MergeVerification {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error without a source
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error without a source
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Map this error to the report-level failure taxonomy, if it
    /// corresponds to a recordable unit or file failure
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Parse { .. } => Some(FailureKind::ParseError),
            Self::InferenceTimeout { .. } => Some(FailureKind::InferenceTimeout),
            Self::InferenceUnreachable { .. } => Some(FailureKind::InferenceUnreachable),
            Self::InvalidResponse { .. } => Some(FailureKind::InvalidResponse),
            Self::MergeVerification { .. } => Some(FailureKind::MergeVerificationError),
            _ => None,
        }
    }

    /// Whether this error means the endpoint itself is down, as opposed
    /// to a single slow or bad completion
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::InferenceUnreachable { .. })
    }
}
