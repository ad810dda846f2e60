//! Wallet notifications and their subscriptions.

use crate::constants::EVENT_CHANNEL_SIZE;
use alloy::primitives::Address;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::warn;

/// Notification pushed by the wallet without a request from us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of exposed accounts changed. Empty when the wallet disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
}

/// Fan-out point for [`WalletEvent`]s.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<WalletEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { tx }
    }

    /// Delivers `event` to all current subscribers. Returns how many received it.
    pub fn emit(&self, event: WalletEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a background listener. Dropping it stops the listener.
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Spawns a task calling `handler` for every event received on `rx`.
    pub fn listen<F>(mut rx: broadcast::Receiver<WalletEvent>, mut handler: F) -> Self
    where
        F: FnMut(WalletEvent) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "wallet event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { task }
    }

    pub(crate) fn from_task(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
