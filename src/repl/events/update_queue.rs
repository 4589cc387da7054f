//! # Update Queue
//!
//! The only path from background work back into the event loop.
//!
//! Producers (the request task, the search-reactive editor) hold a cloned
//! [`UpdateSender`]. The loop owns the [`UpdateQueue`] and drains it once per
//! tick, applying each [`Update`] exactly once and in arrival order, so no
//! region buffer is ever touched off the loop.

use crate::repl::services::http::ExchangeResult;
use tokio::sync::mpsc;

/// A deferred mutation for the event loop to apply
#[derive(Debug)]
pub enum Update {
    /// The outstanding request finished, successfully or not
    ExchangeFinished(Box<ExchangeResult>),
    /// Re-render the response body against the current search text
    RefreshSearch,
}

/// Cloneable producer side of the queue
#[derive(Debug, Clone)]
pub struct UpdateSender {
    sender: mpsc::UnboundedSender<Update>,
}

impl UpdateSender {
    /// Queue an update; silently dropped if the loop is gone
    pub fn send(&self, update: Update) {
        if self.sender.send(update).is_err() {
            tracing::debug!("update queue closed, dropping update");
        }
    }
}

/// Consumer side, owned by the event loop
#[derive(Debug)]
pub struct UpdateQueue {
    sender: mpsc::UnboundedSender<Update>,
    receiver: mpsc::UnboundedReceiver<Update>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Hand out a producer handle
    pub fn sender(&self) -> UpdateSender {
        UpdateSender {
            sender: self.sender.clone(),
        }
    }

    /// Take everything queued so far without waiting
    pub fn drain(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(update) = self.receiver.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Wait for the next update
    pub async fn recv(&mut self) -> Option<Update> {
        self.receiver.recv().await
    }
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}
