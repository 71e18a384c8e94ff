//! Domain-wide constants and defaults

/// Default Ollama endpoint for local inference
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model served by the local endpoint
pub const DEFAULT_MODEL: &str = "codestral";

/// Default per-request inference timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default maximum inference attempts per unit (first try + retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff between retries, in milliseconds
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Ceiling for a single backoff delay, in milliseconds
pub const BACKOFF_CAP_MS: u64 = 30_000;

/// Default number of consecutive unreachable failures that aborts the run
pub const DEFAULT_UNREACHABLE_THRESHOLD: u32 = 5;

/// Default number of source files processed in parallel
pub const DEFAULT_WORKERS: usize = 4;

/// Default character budget for the unit body included in a prompt
pub const DEFAULT_PROMPT_BUDGET: usize = 12_000;

/// Lines kept at each end of a unit body truncated from the middle
pub const TRUNCATION_KEEP_LINES: usize = 20;

/// Default multiplier over the unit header length for the completion
/// length sanity check
pub const DEFAULT_LENGTH_MULTIPLIER: usize = 40;

/// Default floor for the completion length sanity check, in characters
pub const DEFAULT_LENGTH_FLOOR: usize = 4_000;

/// Marker line appended to every generated docstring
pub const GENERATED_MARKER: &str = "This is an autogenerated docstring";

/// Prefix of the staleness hash line that follows the marker
pub const HASH_LINE_PREFIX: &str = "hash ";

/// File extension handled by the Python extractor
pub const PYTHON_EXTENSION: &str = "py";

/// Directories never descended into during discovery
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    "node_modules",
    "target",
];
