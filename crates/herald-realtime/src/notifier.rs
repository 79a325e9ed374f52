//! Fire-and-forget broadcast dispatch.
//!
//! Request handlers hand a notification to a [`Notifier`] and return at once.
//! A background task drains the queue and broadcasts through the hub, so the
//! request path never waits on client delivery.

use crate::hub::Hub;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default number of notifications waiting for dispatch.
pub const DEFAULT_NOTIFIER_CAPACITY: usize = 1024;

/// Handle for scheduling broadcasts. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    /// Start the dispatch task.
    ///
    /// The task runs until every `Notifier` clone has been dropped.
    pub fn spawn(hub: Arc<Hub>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

        let task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let recipients = hub.broadcast(message);
                debug!(recipients, "Notification dispatched");
            }
            debug!("Notifier stopped");
        });

        (Self { tx }, task)
    }

    /// Schedule a broadcast. Returns whether it was queued.
    ///
    /// A full or stopped queue drops the notification with a warning.
    pub fn notify(&self, message: impl Display) -> bool {
        match self.tx.try_send(message.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                warn!(message = %message, "Notification queue full, dropping");
                false
            }
            Err(TrySendError::Closed(message)) => {
                warn!(message = %message, "Notifier stopped, dropping");
                false
            }
        }
    }
}
