//! Provider implementations for the code documentation generator
//!
//! Adapters behind the domain ports:
//!
//! - [`language`] - tree-sitter based unit extraction (Python)
//! - [`inference`] - model inference clients (Ollama, scripted null)

pub mod inference;
pub mod language;

pub use inference::{NullInferenceProvider, OllamaProvider, ScriptedResponse};
pub use language::PythonExtractor;
