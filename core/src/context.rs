//! Per-call execution context
//!
//! Every repository, service and handler call receives a [`Context`]. It
//! carries a cancellation token and an optional deadline; storage access checks
//! both and aborts as soon as either fires.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Cancellation token plus optional deadline threaded through every call
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now, keeping an earlier one if present
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline, keeping an earlier one if present
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already cancelled or past its deadline
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context fires first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(Error::Cancelled),
                result = fut => result,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .map_err(|_| Error::DeadlineExceeded)?,
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_context_passes_check() {
        assert!(Context::background().check().is_ok());
    }

    #[test]
    fn test_cancelled_token_fails_check() {
        let token = CancellationToken::new();
        let ctx = Context::with_token(token.clone());
        token.cancel();

        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_elapsed_deadline_fails_check() {
        let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_earlier_deadline_wins() {
        let soon = Instant::now() + Duration::from_secs(1);
        let ctx = Context::background()
            .with_deadline(soon)
            .with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(soon));
    }

    #[tokio::test]
    async fn test_run_aborts_on_cancel() {
        let token = CancellationToken::new();
        let ctx = Context::with_token(token.clone());

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: Result<()> = ctx.run(std::future::pending()).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_run_aborts_on_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let result: Result<()> = ctx.run(std::future::pending()).await;
        assert!(matches!(result, Err(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_run_returns_inner_result() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }
}
