//! Cancellation propagation for long-running requests (`spec.md` §5).
//!
//! Wraps `tokio_util::sync::CancellationToken`, the same crate the teacher
//! workspace keeps specifically for agent-call cancellation
//! (`llmspell-agents`, per the dependency-decision notes in the teacher's
//! workspace `Cargo.toml`). A `CancellationToken` is threaded through every
//! provider call, Graph Store query/update, and ZPT pipeline stage; a
//! `Deadline` converts a timeout into cancellation so the two failure modes
//! (explicit cancel, deadline exceeded) share one code path.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// A cooperative cancellation signal, cheaply cloneable and shareable across
/// tasks. Cancelling a token cancels every clone and every child derived
/// from it via [`CancellationToken::child_token`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(tokio_util::sync::CancellationToken);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self(tokio_util::sync::CancellationToken::new())
    }

    /// Derive a child token: cancelling the parent cancels the child, but
    /// cancelling the child does not affect the parent or its siblings.
    #[must_use]
    pub fn child_token(&self) -> Self {
        Self(self.0.child_token())
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolve once the token is cancelled. Await this in a `tokio::select!`
    /// alongside provider/storage futures to abort in-flight work.
    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }

    /// Run `fut` to completion, or return `CoreError::Cancelled` if this
    /// token is cancelled first. In-flight work in `fut` is dropped, not
    /// awaited to completion — callers relying on cleanup must structure
    /// `fut` to be cancel-safe (matches `spec.md` §5: "in-flight provider
    /// requests are aborted if the transport supports it").
    pub async fn race<T>(
        &self,
        fut: impl std::future::Future<Output = T>,
    ) -> crate::error::Result<T> {
        tokio::select! {
            () = self.cancelled() => Err(crate::error::CoreError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

/// A deadline that cancels a token once elapsed. Construct with
/// [`Deadline::in_duration`] and pass the paired token into the same call
/// graph as an explicit cancellation would use.
pub struct Deadline {
    token: CancellationToken,
    deadline: Instant,
}

impl Deadline {
    #[must_use]
    pub fn in_duration(duration: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now() + duration,
        }
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawns the background task that cancels the token at the deadline.
    /// Cheap no-op if the deadline has already passed.
    pub fn arm(self) -> CancellationToken {
        let token = self.token.clone();
        let deadline = self.deadline;
        tokio::spawn(async move {
            sleep(deadline.saturating_duration_since(Instant::now())).await;
            token.cancel();
        });
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn race_returns_cancelled_once_token_fires() {
        let token = CancellationToken::new();
        token.cancel();
        let result = token.race(async { 42 }).await;
        assert!(matches!(result, Err(crate::error::CoreError::Cancelled)));
    }

    #[tokio::test]
    async fn race_returns_value_when_not_cancelled() {
        let token = CancellationToken::new();
        let result = token.race(async { 42 }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn deadline_cancels_child_tokens() {
        let deadline = Deadline::in_duration(Duration::from_millis(20));
        let token = deadline.arm();
        let child = token.child_token();
        assert!(!child.is_cancelled());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(child.is_cancelled());
    }
}
