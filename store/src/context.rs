//! Caller-supplied cancellation and deadlines for store operations

use std::future::{pending, Future};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{Result, StoreError};

/// Bounds how long a store operation may wait for the session lock and run
/// its query. Cloning shares the same cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`OpContext`] created alongside it.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl OpContext {
    /// No deadline, not cancellable
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    pub fn cancellable() -> (Self, Canceller) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(rx),
        };
        (ctx, Canceller { tx })
    }

    /// Tighten the deadline to at most `timeout` from now.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        let cancelled = self.cancel.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| d <= Instant::now());
        cancelled || expired
    }

    /// Drive `op` until it finishes, the deadline passes, or the context is
    /// cancelled. On the latter two `op` is dropped, which releases any lock
    /// it holds.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Err(StoreError::cancelled("cancelled by caller"));
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(StoreError::cancelled("deadline exceeded"));
        }

        let cancelled = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        // Canceller dropped without cancelling
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            res = op => res,
            _ = cancelled => Err(StoreError::cancelled("cancelled by caller")),
            _ = expired => Err(StoreError::cancelled("deadline exceeded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = OpContext::background();
        assert_eq!(ctx.run(async { Ok(7) }).await.unwrap(), 7);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let ctx = OpContext::background();
        let res: Result<()> = ctx
            .run(async { Err(StoreError::invalid_timestamp("1", "too short")) })
            .await;
        assert!(matches!(res, Err(StoreError::InvalidTimestamp { .. })));
    }

    #[tokio::test]
    async fn test_timeout_aborts_pending_op() {
        let ctx = OpContext::with_timeout(Duration::from_millis(20));
        let res: Result<()> = ctx.run(pending()).await;
        assert!(res.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_op() {
        let (ctx, canceller) = OpContext::cancellable();
        let task = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.run(pending::<Result<()>>()).await })
        };
        canceller.cancel();
        let res = task.await.unwrap();
        assert!(matches!(res, Err(StoreError::OperationCancelled { .. })));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_op() {
        let (ctx, canceller) = OpContext::cancellable();
        canceller.cancel();
        let res = ctx.run(async { Ok(1) }).await;
        assert!(res.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_canceller_never_cancels() {
        let (ctx, canceller) = OpContext::cancellable();
        drop(canceller);
        let ctx = ctx.timeout(Duration::from_secs(5));
        assert_eq!(ctx.run(async { Ok("done") }).await.unwrap(), "done");
    }

    #[test]
    fn test_timeout_keeps_earliest_deadline() {
        let ctx = OpContext::with_timeout(Duration::from_millis(10));
        let first = ctx.deadline().unwrap();
        let ctx = ctx.timeout(Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(first));
    }
}
