//! Configuration

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, InferenceConfig, LoggingConfig, PromptSettings, RunConfig, ValidatorSettings,
};
