//! Configuration types
//!
//! Serde-backed settings with defaults matching the domain constants.
//! Every field can be overridden from the TOML file or from `CDG_`
//! environment variables.

use serde::{Deserialize, Serialize};

use cdg_domain::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_ENDPOINT, DEFAULT_LENGTH_FLOOR, DEFAULT_LENGTH_MULTIPLIER,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL, DEFAULT_PROMPT_BUDGET, DEFAULT_TIMEOUT_SECS,
    DEFAULT_UNREACHABLE_THRESHOLD, DEFAULT_WORKERS, TRUNCATION_KEEP_LINES,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inference endpoint settings
    pub inference: InferenceConfig,
    /// Run scheduling settings
    pub run: RunConfig,
    /// Prompt construction settings
    pub prompt: PromptSettings,
    /// Response validation settings
    pub validator: ValidatorSettings,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Settings for the local model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the Ollama-compatible endpoint
    pub endpoint: String,
    /// Model name to query
    pub model: String,
    /// Per-request deadline in seconds
    pub timeout_secs: u64,
    /// Context window requested from the model
    pub num_ctx: u32,
    /// Maximum attempts per request (first try + retries)
    pub max_attempts: u32,
    /// Base backoff delay between retries, in milliseconds
    pub backoff_base_ms: u64,
    /// Consecutive unreachable failures that abort the run
    pub unreachable_threshold: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            num_ctx: 32_768,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            unreachable_threshold: DEFAULT_UNREACHABLE_THRESHOLD,
        }
    }
}

/// Run scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of files processed in parallel
    pub workers: usize,
    /// Exclusion globs relative to the run root
    pub exclude: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            exclude: Vec::new(),
        }
    }
}

/// Prompt construction settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Maximum characters of unit body included in a prompt
    pub max_body_chars: usize,
    /// Lines kept at each end when truncating from the middle
    pub keep_lines: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            max_body_chars: DEFAULT_PROMPT_BUDGET,
            keep_lines: TRUNCATION_KEEP_LINES,
        }
    }
}

/// Response validation settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Completion may be at most `multiplier × header length` characters
    pub length_multiplier: usize,
    /// Absolute minimum of the allowed completion length
    pub length_floor: usize,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            length_multiplier: DEFAULT_LENGTH_MULTIPLIER,
            length_floor: DEFAULT_LENGTH_FLOOR,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON-structured log lines instead of human-readable ones
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
