//! Push-style traversal on a background tokio task
//!
//! A stream walks an immutable snapshot of the trie, so a transient handle
//! may keep changing while the consumer drains it. Entries travel through a
//! bounded channel; the producer stops when the consumer cancels, drops the
//! receiver, or the snapshot is exhausted.

use crate::error::{Error, Result};
use crate::iter::IntoIter;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

/// Cooperative cancellation signal shared between a consumer and producers
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        CancelToken { tx: Arc::new(tx) }
    }

    /// Signal every clone of this token. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        wait_cancelled(&mut self.tx.subscribe()).await;
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// The sender lives as long as the token, so this only returns on cancel
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a trie stream
#[derive(Debug)]
pub struct HamtStream<K, V> {
    rx: mpsc::Receiver<(K, V)>,
}

impl<K, V> HamtStream<K, V> {
    /// Next entry, or `None` once the producer has stopped
    pub async fn recv(&mut self) -> Option<(K, V)> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for use outside async code.
    /// Panics if called from within an async execution context.
    pub fn blocking_recv(&mut self) -> Option<(K, V)> {
        self.rx.blocking_recv()
    }

    /// Stop receiving; the producer notices on its next send
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Spawn a producer over `entries` on the current tokio runtime.
/// A `buffer` of zero is treated as one.
pub(crate) fn spawn<K, V>(
    entries: IntoIter<K, V>,
    buffer: usize,
    cancel: CancelToken,
) -> Result<HamtStream<K, V>>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let total = entries.len();

    runtime.spawn(async move {
        tracing::debug!(entries = total, "stream started");
        let mut cancelled = cancel.subscribe();
        let mut sent = 0usize;
        for entry in entries {
            tokio::select! {
                biased;
                _ = wait_cancelled(&mut cancelled) => {
                    tracing::debug!(sent, "stream cancelled");
                    return;
                }
                res = tx.send(entry) => {
                    if res.is_err() {
                        tracing::debug!(sent, "stream receiver dropped");
                        return;
                    }
                }
            }
            sent += 1;
        }
        tracing::debug!(sent, "stream finished");
    });

    Ok(HamtStream { rx })
}
