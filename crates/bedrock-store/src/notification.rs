//! # Notification Center
//!
//! One slot holding the latest [`Notification`]. Setting a new one
//! overwrites the old; an observer that was not looking in between never sees
//! the first. Observers subscribe to a `watch` channel and always read the
//! current value.

use tokio::sync::watch;
use tracing::debug;

use bedrock_core::Notification;

#[derive(Debug)]
pub struct NotificationCenter {
    tx: watch::Sender<Option<Notification>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        NotificationCenter { tx }
    }

    /// Overwrites the current notification.
    pub fn set_notification(&self, notification: Notification) {
        debug!(
            severity = %notification.severity,
            message = %notification.message,
            "Notification raised"
        );
        self.tx.send_replace(Some(notification));
    }

    pub fn current(&self) -> Option<Notification> {
        self.tx.borrow().clone()
    }

    /// Dismisses the current notification.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.tx.subscribe()
    }
}
