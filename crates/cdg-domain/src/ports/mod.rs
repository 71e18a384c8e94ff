//! Ports - traits implemented by provider and infrastructure crates

pub mod infrastructure;
pub mod providers;

pub use infrastructure::Sleeper;
pub use providers::{InferenceProvider, UnitExtractor};
