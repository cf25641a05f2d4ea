//! Request-scoped cancellation
//!
//! Every async trait method takes a `Context` as its first parameter. Long
//! running operations (such as paging through a large collection) check it
//! between network calls and stop once the caller has gone away.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    cancel_tx: watch::Sender<bool>,
    parent: Option<Context>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                cancel_tx,
                parent: None,
            }),
        }
    }

    /// Child context that expires after `timeout`, or when this one is cancelled
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let deadline = match self.deadline() {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };

        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                cancel_tx,
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if *self.inner.cancel_tx.borrow() {
            return true;
        }
        if self.inner.deadline.is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.is_cancelled())
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    pub fn cancel(&self) {
        self.inner.cancel_tx.send_replace(true);
    }

    /// Resolves once `is_cancelled` would return true: this context was
    /// cancelled, its deadline passed, or an ancestor was cancelled.
    pub fn cancelled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut rx = self.inner.cancel_tx.subscribe();
            let own = async move {
                // Err means the sender is gone, which cannot happen while self is alive
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            };
            let deadline = async {
                match self.inner.deadline {
                    Some(at) => tokio::time::sleep_until(at.into()).await,
                    None => std::future::pending().await,
                }
            };
            let parent = async {
                match &self.inner.parent {
                    Some(parent) => parent.cancelled().await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = own => {}
                _ = deadline => {}
                _ = parent => {}
            }
        })
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
