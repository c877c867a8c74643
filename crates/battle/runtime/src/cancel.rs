//! Battle-scoped cancellation signal.
//!
//! One signal is created per battle session and threaded through every
//! suspending call: decision waits, input polling, movement interpolation,
//! and presentation delays. Cancellation is the expected, non-error way to
//! stop a battle early; observers unwind cleanly without running further
//! turns. A restart replaces the signal instead of reusing it.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable cancellation signal. All clones observe the same battle.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Requests cancellation. Idempotent; wakes every pending waiter.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been requested. Never resolves
    /// otherwise, so it is meant for the cancel arm of a `select!`.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling: stay pending forever.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
