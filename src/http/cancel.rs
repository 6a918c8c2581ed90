//! Cancellation for in-flight requests.

use std::sync::Arc;
use tokio::sync::watch;

/// Cancels every request it was handed to. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    notify: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            notify: Arc::new(tx),
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.notify.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.notify.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.notify.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
