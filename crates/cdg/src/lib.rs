//! Wiring for the code documentation generator
//!
//! Loads configuration, initializes logging, assembles the providers and
//! the run coordinator, installs the Ctrl-C cancellation handler, runs
//! the pipeline, and emits the run report as JSON on stdout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cdg_application::coordinator::{CoordinatorConfig, RunCoordinator};
use cdg_application::prompt::{PromptBuilder, PromptConfig};
use cdg_application::validate::{ResponseValidator, ValidatorConfig};
use cdg_domain::error::{Error, Result};
use cdg_domain::value_objects::RunReport;
use cdg_infrastructure::config::{AppConfig, ConfigLoader};
use cdg_infrastructure::logging::init_logging;
use cdg_providers::inference::OllamaProvider;
use cdg_providers::language::PythonExtractor;

/// Tokio-backed sleeper for retry backoff
struct TokioSleeper;

#[async_trait::async_trait]
impl cdg_domain::ports::Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run the pipeline over `root` and return the finished report
///
/// A fatal endpoint abort is reported inside the `RunReport`, not as an
/// `Err`; errors here mean the run could not start at all.
pub async fn run(root: &Path, config_path: Option<&Path>) -> Result<RunReport> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    init_logging(&config.logging)?;

    if !root.is_dir() {
        return Err(Error::config(format!(
            "root is not a directory: {}",
            root.display()
        )));
    }

    let coordinator = build_coordinator(&config)?;
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing in-flight requests, issuing no new ones");
            ctrl_c_cancel.cancel();
        }
    });

    info!(
        root = %root.display(),
        model = config.inference.model,
        endpoint = config.inference.endpoint,
        "starting documentation run"
    );
    coordinator.run(root, cancel).await
}

/// Assemble the coordinator from configuration
fn build_coordinator(config: &AppConfig) -> Result<RunCoordinator> {
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;

    let inference = Arc::new(OllamaProvider::new(
        config.inference.endpoint.clone(),
        config.inference.model.clone(),
        Duration::from_secs(config.inference.timeout_secs),
        config.inference.num_ctx,
        http_client,
    ));

    let prompts = PromptBuilder::new(PromptConfig {
        max_body_chars: config.prompt.max_body_chars,
        keep_lines: config.prompt.keep_lines,
    });
    let validator = ResponseValidator::new(ValidatorConfig {
        length_multiplier: config.validator.length_multiplier,
        length_floor: config.validator.length_floor,
    });

    Ok(RunCoordinator::new(
        Arc::new(PythonExtractor::new()),
        inference,
        Arc::new(TokioSleeper),
        prompts,
        validator,
        CoordinatorConfig {
            workers: config.run.workers,
            max_attempts: config.inference.max_attempts,
            backoff_base: Duration::from_millis(config.inference.backoff_base_ms),
            unreachable_threshold: config.inference.unreachable_threshold,
            exclude: config.run.exclude.clone(),
        },
    ))
}
