//! Stop signal for the daemon's background tasks.
//!
//! `ReloadWatch` owns one handle for its reader task and the periodic
//! trigger owns another for its tick loop. Both loops `select!` on their
//! receiver next to a `time::interval` and break when it fires.

use tokio::sync::broadcast;

/// One-shot stop signal shared by a group of tasks.
///
/// Subscribe before spawning the task; a task that subscribes after
/// [`trigger`](Self::trigger) never sees the signal.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Wake every subscribed loop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Receivers not yet dropped, i.e. loops that have not exited.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
