//! Infrastructure layer for the code documentation generator
//!
//! Configuration loading (figment: defaults, TOML file, environment)
//! and tracing-based logging initialization.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use logging::init_logging;
