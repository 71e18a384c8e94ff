//! Unit and file state machines plus the failure taxonomy
//!
//! The extractor classifies every documentable construct exactly once;
//! all downstream components consume the tagged variant instead of
//! re-inspecting source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of documentable construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A whole source file's module header
    Module,
    /// A class definition
    Class,
    /// A function or method definition
    Function,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
        }
    }
}

/// Why a unit or file failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The source file did not parse; the whole file was skipped
    ParseError,
    /// The endpoint answered too slowly, retries exhausted
    InferenceTimeout,
    /// The endpoint could not be reached
    InferenceUnreachable,
    /// The completion failed validation, retry included
    InvalidResponse,
    /// The merged file no longer matched the original structure
    MergeVerificationError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError => write!(f, "ParseError"),
            Self::InferenceTimeout => write!(f, "InferenceTimeout"),
            Self::InferenceUnreachable => write!(f, "InferenceUnreachable"),
            Self::InvalidResponse => write!(f, "InvalidResponse"),
            Self::MergeVerificationError => write!(f, "MergeVerificationError"),
        }
    }
}

/// Per-unit processing state
///
/// Legal transitions: `Pending → Requested → AwaitingMerge → Merged`,
/// with `Failed` reachable from `Requested` and `AwaitingMerge`, and
/// `Pending → Merged { skipped: true }` for the idempotent skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitState {
    /// Not yet looked at
    Pending,
    /// An inference request is in flight (or being retried)
    Requested,
    /// A validated completion is waiting to be merged
    AwaitingMerge,
    /// Documentation is present in the rewritten file
    Merged {
        /// True when the existing docstring was kept and no inference
        /// request was issued
        skipped: bool,
    },
    /// The unit could not be annotated
    Failed(FailureKind),
}

impl UnitState {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Merged { .. } | Self::Failed(_))
    }
}

/// Per-file processing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileState {
    /// Text loaded and parsed, units pending
    Loaded,
    /// Every unit reached a terminal state
    UnitsResolved,
    /// The rewritten file was flushed to disk
    Written,
    /// The file was skipped; the on-disk bytes are untouched
    Skipped(FailureKind),
}
