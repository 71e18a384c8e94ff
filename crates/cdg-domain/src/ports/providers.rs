//! Provider ports
//!
//! Traits implemented by the adapters in `cdg-providers`. The application
//! layer depends only on these, never on a concrete endpoint or parser.

use std::path::Path;

use async_trait::async_trait;

use crate::entities::CodeUnit;
use crate::error::Result;

/// Port for the model inference endpoint
///
/// A single blocking completion call. Retry, backoff, and the
/// consecutive-unreachable escalation live in the coordinator, not in
/// implementations of this trait.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Send a prompt, return the raw completion text
    ///
    /// # Errors
    ///
    /// `Error::Network` for a per-request timeout,
    /// `Error::InferenceUnreachable` when the endpoint cannot be reached.
    async fn infer(&self, prompt: &str) -> Result<String>;

    /// Name of the model being queried, for logging and reports
    fn model(&self) -> &str;
}

/// Port for parsing a source file into its documentable units
pub trait UnitExtractor: Send + Sync {
    /// Parse `text` into units, outermost first, in source order
    ///
    /// Returns an empty vector for a file with nothing documentable.
    ///
    /// # Errors
    ///
    /// `Error::Parse` when the file is not valid source; no partial
    /// extraction is attempted.
    fn extract(&self, path: &Path, text: &str) -> Result<Vec<CodeUnit>>;

    /// File extension this extractor handles, without the dot
    fn extension(&self) -> &str;
}
