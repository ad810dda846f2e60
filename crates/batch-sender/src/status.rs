//! Transient status messages.

use crate::constants::EVENT_CHANNEL_SIZE;
use parking_lot::Mutex;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// In-progress message. Stays until replaced.
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub const fn auto_clears(self) -> bool {
        !matches!(self, Self::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Holds the current status message and its pending clear timer.
///
/// Setting a message cancels the timer of the previous one. Success and error
/// messages schedule a clear after `clear_after`; info messages do not.
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<Option<StatusMessage>>>,
    feed: broadcast::Sender<StatusMessage>,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
    clear_after: Duration,
}

impl StatusBoard {
    pub fn new(clear_after: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        let (feed, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            tx: Arc::new(tx),
            feed,
            pending_clear: Mutex::new(None),
            clear_after,
        }
    }

    pub fn show(&self, kind: StatusKind, text: impl Into<String>) {
        let message = StatusMessage::new(kind, text);
        let mut pending = self.pending_clear.lock();
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        tracing::debug!(?kind, text = %message.text, "status");
        self.tx.send_replace(Some(message.clone()));
        // No listeners is fine.
        let _ = self.feed.send(message.clone());

        if kind.auto_clears() {
            let tx = Arc::clone(&self.tx);
            let delay = self.clear_after;
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                tx.send_if_modified(|current| {
                    if current.as_ref() == Some(&message) {
                        *current = None;
                        true
                    } else {
                        false
                    }
                });
            }));
        }
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(StatusKind::Info, text);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(StatusKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(StatusKind::Error, text);
    }

    /// Removes the current message and cancels its timer.
    pub fn clear(&self) {
        if let Some(timer) = self.pending_clear.lock().take() {
            timer.abort();
        }
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<StatusMessage> {
        self.tx.borrow().clone()
    }

    /// Receiver of the current message. Changes in quick succession may be
    /// observed only as the latest one.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusMessage>> {
        self.tx.subscribe()
    }

    /// Every message shown from now on, in order. Clears are not reported.
    pub fn feed(&self) -> broadcast::Receiver<StatusMessage> {
        self.feed.subscribe()
    }
}

impl Drop for StatusBoard {
    fn drop(&mut self) {
        if let Some(timer) = self.pending_clear.get_mut().take() {
            timer.abort();
        }
    }
}
