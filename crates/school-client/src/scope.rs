//! Cancellation scopes tied to a screen's lifetime.
//!
//! A screen creates one [`Scope`] and runs its requests through it. When the
//! scope is cancelled, or dropped with the screen, pending requests resolve to
//! [`ClientError::Cancelled`] instead of updating a view that no longer exists.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{ClientError, Result};

#[derive(Debug)]
pub struct Scope {
    name: String,
    cancelled: watch::Sender<bool>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            name: name.into(),
            cancelled,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        if !*self.cancelled.borrow() {
            tracing::debug!(scope = %self.name, "Scope cancelled");
        }
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Handle that can cancel this scope from another task (e.g. a signal handler).
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            cancelled: self.cancelled.clone(),
        }
    }

    /// Drive `fut` to completion unless the scope is cancelled first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut rx = self.cancelled.subscribe();
        if *rx.borrow_and_update() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            result = fut => result,
            _ = rx.wait_for(|cancelled| *cancelled) => {
                tracing::debug!(scope = %self.name, "Request abandoned");
                Err(ClientError::Cancelled)
            }
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.cancelled.send_replace(true);
    }
}

/// Cloneable cancel trigger for a [`Scope`].
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    cancelled: watch::Sender<bool>,
}

impl ScopeHandle {
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }
}
