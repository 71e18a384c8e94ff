//! Application layer for the code documentation generator
//!
//! The extraction-annotation-merge pipeline, written against the domain
//! ports only:
//!
//! - [`discovery`] - codebase walking and exclusion filtering
//! - [`prompt`] - bounded prompt construction per unit
//! - [`validate`] - completion validation and normalization
//! - [`marker`] - generation markers and staleness hashes
//! - [`merge`] - span-precise docstring merging with re-parse verification
//! - [`coordinator`] - worker pool, per-unit state, report accumulation

pub mod coordinator;
pub mod discovery;
pub mod marker;
pub mod merge;
pub mod prompt;
pub mod validate;

pub use coordinator::{CoordinatorConfig, RunCoordinator};
pub use prompt::{BuiltPrompt, PromptBuilder, PromptConfig};
pub use validate::{ResponseValidator, ValidatorConfig};
