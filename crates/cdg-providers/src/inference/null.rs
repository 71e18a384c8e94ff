//! Scripted null inference provider
//!
//! Answers from a fixed script instead of a network endpoint. Used by
//! coordinator tests (deterministic completions, injected failures) and
//! by dry runs. Also counts how many requests were issued, which is what
//! the idempotence tests assert on.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use cdg_domain::error::{Error, Result};
use cdg_domain::ports::InferenceProvider;

/// One scripted answer
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Return this completion text
    Completion(String),
    /// Fail as a per-request timeout
    Timeout,
    /// Fail as endpoint-unreachable
    Unreachable,
}

/// Inference provider that replays a script
///
/// When the script is exhausted the provider keeps returning the
/// fallback completion, so tests only script the interesting prefix.
pub struct NullInferenceProvider {
    script: Mutex<VecDeque<ScriptedResponse>>,
    fallback: String,
    calls: AtomicUsize,
}

impl NullInferenceProvider {
    /// Provider that always answers `fallback`
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that replays `script`, then falls back to `fallback`
    pub fn with_script(
        fallback: impl Into<String>,
        script: impl IntoIterator<Item = ScriptedResponse>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: fallback.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of inference calls issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceProvider for NullInferenceProvider {
    async fn infer(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();
        match next {
            Some(ScriptedResponse::Completion(text)) => Ok(text),
            Some(ScriptedResponse::Timeout) => {
                Err(Error::network("scripted timeout".to_string()))
            }
            Some(ScriptedResponse::Unreachable) => {
                Err(Error::unreachable("scripted connection refused"))
            }
            None => Ok(self.fallback.clone()),
        }
    }

    fn model(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let provider = NullInferenceProvider::with_script(
            "fallback doc",
            [
                ScriptedResponse::Completion("first".to_string()),
                ScriptedResponse::Timeout,
            ],
        );

        assert_eq!(provider.infer("p").await.unwrap(), "first");
        assert!(provider.infer("p").await.is_err());
        assert_eq!(provider.infer("p").await.unwrap(), "fallback doc");
        assert_eq!(provider.calls(), 3);
    }
}
