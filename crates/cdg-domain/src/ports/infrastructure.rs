//! Infrastructure ports

use std::time::Duration;

use async_trait::async_trait;

/// Port for waiting between retry attempts
///
/// Backoff loops are expressed as explicit state transitions with an
/// injected sleeper, so tests can run them without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper that does not sleep, for tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
