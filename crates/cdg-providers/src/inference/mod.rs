//! Inference providers
//!
//! Clients for the local model endpoint, plus a scripted null provider
//! used by tests and dry runs.

pub mod null;
pub mod ollama;

pub use null::{NullInferenceProvider, ScriptedResponse};
pub use ollama::OllamaProvider;
