//! Notification buffer drained into the next account view.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use clubhouse_core::ports::{NotificationKind, NotificationSink};

use crate::models::Notification;

/// Message shown after a successful save.
pub const SAVE_SUCCESS: &str = "Profile updated successfully";

/// Queue of notifications waiting to be shown.
#[derive(Debug, Default)]
pub struct NotificationBuffer {
    pending: Mutex<Vec<Notification>>,
}

impl NotificationBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }

    /// Remove the newest queued notification matching `kind` and `message`.
    ///
    /// Returns whether one was removed.
    pub fn withdraw(&self, kind: NotificationKind, message: &str) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = pending
            .iter()
            .rposition(|n| n.kind == kind && n.message == message)
        else {
            return false;
        };
        pending.remove(index);
        true
    }
}

impl NotificationSink for NotificationBuffer {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(message, "Notify"),
            NotificationKind::Error => warn!(message, "Notify"),
        }

        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                kind,
                message: message.to_owned(),
            });
    }
}
