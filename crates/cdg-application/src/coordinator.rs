//! Run coordinator
//!
//! Drives one pipeline invocation: discovers files, processes them on a
//! bounded worker pool, tracks per-unit state, applies the idempotence
//! rule, aggregates the run report, and is the only component that
//! writes files to disk. Files are independent; units within one file
//! are processed sequentially because all merges land on a single text
//! buffer.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cdg_domain::constants::{
    BACKOFF_CAP_MS, DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_UNREACHABLE_THRESHOLD,
    DEFAULT_WORKERS,
};
use cdg_domain::entities::{CodeUnit, SourceFile};
use cdg_domain::error::{Error, Result};
use cdg_domain::ports::{InferenceProvider, Sleeper, UnitExtractor};
use cdg_domain::value_objects::{
    FailureKind, FileOutcome, FileState, RunReport, UnitOutcome, UnitState,
};

use crate::discovery;
use crate::marker;
use crate::merge::{self, DocMerge};
use crate::prompt::PromptBuilder;
use crate::validate::ResponseValidator;

/// Coordinator tuning knobs
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Number of files processed in parallel
    pub workers: usize,
    /// Maximum inference attempts per request (first try + retries)
    pub max_attempts: u32,
    /// Base delay for exponential backoff between retries
    pub backoff_base: Duration,
    /// Consecutive unreachable failures that abort the whole run
    pub unreachable_threshold: u32,
    /// Exclusion globs, relative to the run root
    pub exclude: Vec<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            unreachable_threshold: DEFAULT_UNREACHABLE_THRESHOLD,
            exclude: Vec::new(),
        }
    }
}

/// How one inference exchange ended
enum InferOutcome {
    /// The endpoint answered
    Completion(String),
    /// Retries exhausted on timeouts
    TimedOut { attempts: u32, reason: String },
    /// The endpoint could not be reached
    Unreachable { reason: String },
    /// The run was cancelled before the request could be issued
    Cancelled,
}

/// How one unit was resolved
enum UnitResolution {
    /// Terminal state reached; content present when a merge is pending
    Resolved {
        state: UnitState,
        content: Option<String>,
        reason: Option<String>,
    },
    /// Cancellation hit before this unit finished
    Abandoned,
}

/// The run coordinator
#[derive(Clone)]
pub struct RunCoordinator {
    extractor: Arc<dyn UnitExtractor>,
    inference: Arc<dyn InferenceProvider>,
    sleeper: Arc<dyn Sleeper>,
    prompts: PromptBuilder,
    validator: ResponseValidator,
    config: CoordinatorConfig,
}

impl RunCoordinator {
    /// Create a coordinator over the given ports
    pub fn new(
        extractor: Arc<dyn UnitExtractor>,
        inference: Arc<dyn InferenceProvider>,
        sleeper: Arc<dyn Sleeper>,
        prompts: PromptBuilder,
        validator: ResponseValidator,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            extractor,
            inference,
            sleeper,
            prompts,
            validator,
            config,
        }
    }

    /// Run the pipeline over every matching file under `root`
    ///
    /// Unit-level failures are recorded and processing continues; only
    /// the consecutive-unreachable escalation aborts the run, and that
    /// abort is reported in the returned `RunReport`, not as an `Err`.
    pub async fn run(&self, root: &Path, cancel: CancellationToken) -> Result<RunReport> {
        let exclude = discovery::build_exclude_set(&self.config.exclude)?;
        let files = discovery::discover_files(root, self.extractor.extension(), &exclude)?;
        info!(files = files.len(), root = %root.display(), "run starting");

        let report = Arc::new(Mutex::new(RunReport::new(root.display().to_string())));
        let consecutive_unreachable = Arc::new(AtomicU32::new(0));
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));

        let mut tasks = JoinSet::new();
        for path in files {
            let coordinator = self.clone();
            let report = Arc::clone(&report);
            let counter = Arc::clone(&consecutive_unreachable);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                if cancel.is_cancelled() {
                    return;
                }
                coordinator
                    .process_file(&path, &report, &counter, &cancel)
                    .await;
            });
        }
        while tasks.join_next().await.is_some() {}

        let mut report = Arc::try_unwrap(report)
            .map_err(|_| Error::config("report still shared after join"))?
            .into_inner();
        report.finalize();
        info!(
            merged = report.units_merged(),
            skipped = report.units_skipped(),
            failed = report.units_failed(),
            fatal = report.is_fatal(),
            "run finished"
        );
        Ok(report)
    }

    /// Process one source file end to end
    async fn process_file(
        &self,
        path: &PathBuf,
        report: &Mutex<RunReport>,
        counter: &AtomicU32,
        cancel: &CancellationToken,
    ) {
        let path_display = path.display().to_string();

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %path_display, error = %e, "failed to read file");
                self.record_skipped_file(report, &path_display, FailureKind::ParseError, e.to_string())
                    .await;
                return;
            }
        };

        let units = match self.extractor.extract(path, &text) {
            Ok(units) => units,
            Err(e) => {
                warn!(file = %path_display, error = %e, "file skipped: parse error");
                self.record_skipped_file(report, &path_display, FailureKind::ParseError, e.to_string())
                    .await;
                return;
            }
        };

        let file = SourceFile::new(path.clone(), text, units);
        let mut states: Vec<(UnitState, Option<String>)> = Vec::with_capacity(file.units.len());
        let mut merges: Vec<DocMerge> = Vec::new();
        let mut abandoned = false;

        for (index, unit) in file.units.iter().enumerate() {
            match self.resolve_unit(unit, &file, report, counter, cancel).await {
                UnitResolution::Resolved {
                    state,
                    content,
                    reason,
                } => {
                    if let Some(content) = content {
                        merges.push(DocMerge {
                            unit_index: index,
                            content,
                        });
                    }
                    states.push((state, reason));
                }
                UnitResolution::Abandoned => {
                    // Not fully merged: leave the file unwritten so the
                    // on-disk codebase never holds a partial rewrite
                    debug!(file = %path_display, "file abandoned on cancellation");
                    abandoned = true;
                    break;
                }
            }
        }

        if abandoned {
            // Report whatever reached a terminal state; the file itself
            // stays in Loaded and the disk is untouched
            self.record_outcomes(
                report,
                &file,
                &states,
                FileState::Loaded,
                Some("run cancelled before all units resolved".to_string()),
            )
            .await;
            return;
        }

        let file_state = if merges.is_empty() {
            // Nothing to change; re-runs stay byte-identical
            FileState::UnitsResolved
        } else {
            match merge::merge_file(self.extractor.as_ref(), &file, &merges) {
                Ok(merged_text) => match write_atomically(path, &merged_text) {
                    Ok(()) => {
                        info!(file = %path_display, merged = merges.len(), "file written");
                        FileState::Written
                    }
                    Err(e) => {
                        warn!(file = %path_display, error = %e, "write failed");
                        for merge in &merges {
                            states[merge.unit_index].0 =
                                UnitState::Failed(FailureKind::MergeVerificationError);
                            states[merge.unit_index].1 = Some(e.to_string());
                        }
                        FileState::Skipped(FailureKind::MergeVerificationError)
                    }
                },
                Err(e) => {
                    warn!(file = %path_display, error = %e, "merge verification failed; file untouched");
                    for merge in &merges {
                        states[merge.unit_index].0 =
                            UnitState::Failed(FailureKind::MergeVerificationError);
                        states[merge.unit_index].1 = Some(e.to_string());
                    }
                    FileState::Skipped(FailureKind::MergeVerificationError)
                }
            }
        };

        self.record_outcomes(report, &file, &states, file_state, None)
            .await;
    }

    /// Push the file outcome and every resolved unit outcome
    async fn record_outcomes(
        &self,
        report: &Mutex<RunReport>,
        file: &SourceFile,
        states: &[(UnitState, Option<String>)],
        file_state: FileState,
        file_reason: Option<String>,
    ) {
        let mut guard = report.lock().await;
        let mut outcome = FileOutcome {
            path: file.display_path(),
            state: file_state,
            units_total: file.units.len(),
            units_merged: 0,
            units_skipped: 0,
            units_failed: 0,
            reason: file_reason,
        };
        for (unit, (state, reason)) in file.units.iter().zip(states) {
            // AwaitingMerge collapses to Merged only once the write
            // succeeded; on an abandoned file the validated completion
            // was discarded and the unit is not merged
            let (terminal, reason) = match state {
                UnitState::AwaitingMerge if file_state == FileState::Written => {
                    (UnitState::Merged { skipped: false }, reason.clone())
                }
                UnitState::AwaitingMerge => (
                    UnitState::AwaitingMerge,
                    Some("validated completion discarded; file was not written".to_string()),
                ),
                other => (*other, reason.clone()),
            };
            match terminal {
                UnitState::Merged { skipped: true } => outcome.units_skipped += 1,
                UnitState::Merged { skipped: false } => outcome.units_merged += 1,
                UnitState::Failed(_) => outcome.units_failed += 1,
                _ => {}
            }
            guard.record_unit(UnitOutcome {
                file: outcome.path.clone(),
                unit: unit.qualified_name.clone(),
                kind: unit.kind,
                state: terminal,
                reason,
            });
        }
        guard.record_file(outcome);
    }

    /// Resolve one unit: idempotent skip, or annotate via the model
    async fn resolve_unit(
        &self,
        unit: &CodeUnit,
        file: &SourceFile,
        report: &Mutex<RunReport>,
        counter: &AtomicU32,
        cancel: &CancellationToken,
    ) -> UnitResolution {
        let header_len = unit.header_span.len().max(1);
        let doc_spans: Vec<_> = file.units.iter().filter_map(|u| u.doc_span).collect();
        let current_hash = marker::unit_hash(unit, &file.text, &doc_spans);

        // Idempotence: an existing well-formed docstring is kept, unless
        // it is one of ours and the code changed under it
        if let Some(doc_expr) = unit.doc_text(&file.text) {
            let content = marker::doc_content(doc_expr);
            if self.validator.is_well_formed(content, header_len) {
                let stale = marker::stored_hash(content)
                    .is_some_and(|stored| stored != current_hash);
                if !stale {
                    debug!(unit = %unit.qualified_name, "already documented, skipping");
                    return UnitResolution::Resolved {
                        state: UnitState::Merged { skipped: true },
                        content: None,
                        reason: None,
                    };
                }
                debug!(unit = %unit.qualified_name, "generated doc is stale, regenerating");
            }
        }

        let mut strict = false;
        loop {
            if cancel.is_cancelled() {
                return UnitResolution::Abandoned;
            }

            let prompt = self.prompts.build(unit, &file.text, strict);
            let outcome = self
                .infer_with_retry(&prompt.text, report, counter, cancel)
                .await;

            match outcome {
                InferOutcome::Completion(raw) => {
                    counter.store(0, Ordering::SeqCst);
                    match self.validator.validate(&raw, header_len) {
                        Ok(content) => {
                            return UnitResolution::Resolved {
                                state: UnitState::AwaitingMerge,
                                content: Some(marker::append_marker(&content, &current_hash)),
                                reason: None,
                            };
                        }
                        Err(reason) if !strict => {
                            debug!(unit = %unit.qualified_name, %reason, "invalid completion, retrying strict");
                            strict = true;
                        }
                        Err(reason) => {
                            return UnitResolution::Resolved {
                                state: UnitState::Failed(FailureKind::InvalidResponse),
                                content: None,
                                reason: Some(reason),
                            };
                        }
                    }
                }
                InferOutcome::TimedOut { attempts, reason } => {
                    return UnitResolution::Resolved {
                        state: UnitState::Failed(FailureKind::InferenceTimeout),
                        content: None,
                        reason: Some(format!("{reason} (after {attempts} attempts)")),
                    };
                }
                InferOutcome::Unreachable { reason } => {
                    return UnitResolution::Resolved {
                        state: UnitState::Failed(FailureKind::InferenceUnreachable),
                        content: None,
                        reason: Some(reason),
                    };
                }
                InferOutcome::Cancelled => return UnitResolution::Abandoned,
            }
        }
    }

    /// One inference exchange with timeout retries and backoff
    async fn infer_with_retry(
        &self,
        prompt: &str,
        report: &Mutex<RunReport>,
        counter: &AtomicU32,
        cancel: &CancellationToken,
    ) -> InferOutcome {
        let mut last_reason = String::new();
        for attempt in 1..=self.config.max_attempts {
            if cancel.is_cancelled() {
                return InferOutcome::Cancelled;
            }
            report.lock().await.record_inference_request();

            match self.inference.infer(prompt).await {
                Ok(text) => return InferOutcome::Completion(text),
                Err(e) if e.is_unreachable() => {
                    let consecutive = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(consecutive, error = %e, "inference endpoint unreachable");
                    if consecutive >= self.config.unreachable_threshold {
                        report
                            .lock()
                            .await
                            .record_fatal(format!("endpoint presumed down: {e}"));
                        cancel.cancel();
                    }
                    return InferOutcome::Unreachable {
                        reason: e.to_string(),
                    };
                }
                Err(e) => {
                    last_reason = e.to_string();
                    debug!(attempt, error = %e, "inference attempt failed");
                    if attempt < self.config.max_attempts {
                        self.sleeper.sleep(backoff_delay(self.config.backoff_base, attempt)).await;
                    }
                }
            }
        }
        InferOutcome::TimedOut {
            attempts: self.config.max_attempts,
            reason: last_reason,
        }
    }

    async fn record_skipped_file(
        &self,
        report: &Mutex<RunReport>,
        path: &str,
        kind: FailureKind,
        reason: String,
    ) {
        report.lock().await.record_file(FileOutcome {
            path: path.to_string(),
            state: FileState::Skipped(kind),
            units_total: 0,
            units_merged: 0,
            units_skipped: 0,
            units_failed: 0,
            reason: Some(reason),
        });
    }
}

/// Exponential backoff, capped
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor)
        .min(Duration::from_millis(BACKOFF_CAP_MS))
}

/// Write `content` to a temporary file next to `path`, then rename it
/// over the original; readers never observe a partial file
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io { source: e.error })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 32), Duration::from_millis(BACKOFF_CAP_MS));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.py");
        std::fs::write(&path, "old").unwrap();
        write_atomically(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
