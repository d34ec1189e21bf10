//! Cooperative cancellation for in-flight scoring requests.

use std::sync::Arc;
use tokio::sync::watch;

/// A handle allowing an in-flight asynchronous operation to be told to stop
/// and settle early.
///
/// Clones observe the same underlying flag. The transport layer races
/// [`cancelled`](Self::cancelled) against the network call with
/// `tokio::select!`, so a triggered token always settles the awaiting caller
/// promptly instead of leaving it hung.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Triggers cancellation. Idempotent.
    pub fn cancel(&self) {
        // Send only fails when every receiver is gone, which cannot happen
        // while this token holds one.
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token has been triggered.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        // Every token holds the sender, so the channel never closes while
        // someone awaits it.
        std::future::pending::<()>().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_resolves_waiting_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();

        let waiter = tokio::spawn(async move {
            observer.cancelled().await;
        });

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancelled() must settle after cancel()")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_triggered() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-triggered token must resolve immediately");
    }

    #[tokio::test]
    async fn untriggered_token_does_not_resolve() {
        let token = CancellationToken::new();
        let result =
            tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(result.is_err(), "token resolved without being cancelled");
    }
}
