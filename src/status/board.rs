//! Latest worker status snapshot, shared with renderers.

use super::types::NetworkStatus;
use std::sync::Arc;
use tokio::sync::watch;

/// Latest snapshot, or `None` until the first successful poll.
pub type Snapshot = Option<Vec<NetworkStatus>>;

/// Holds the most recent snapshot; every successful poll replaces it wholesale.
///
/// Cloning is cheap and all clones share the same state.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<Snapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// True until the first snapshot lands.
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_none()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot and notify subscribers.
    pub fn replace(&self, statuses: Vec<NetworkStatus>) {
        self.tx.send_replace(Some(statuses));
    }

    /// Receiver that wakes on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
