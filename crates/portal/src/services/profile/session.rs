//! Per-user profile session shared between requests.

use std::sync::{Mutex, PoisonError};

use clubhouse_core::ProfileError;
use clubhouse_core::ports::{BlobStore, NotificationKind};
use clubhouse_core::workspace::Workspace;

use super::avatar::AvatarResolver;
use super::notify::NotificationBuffer;
use crate::models::AccountView;

/// A user's workspace plus their pending notifications.
///
/// The workspace lock is only ever taken inside [`ProfileSession::with`],
/// which is synchronous, so it is never held across an `.await`.
#[derive(Debug, Default)]
pub struct ProfileSession {
    workspace: Mutex<Workspace>,
    notifications: NotificationBuffer,
}

impl ProfileSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the workspace.
    pub fn with<R>(&self, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let mut workspace = self.workspace.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut workspace)
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationBuffer {
        &self.notifications
    }

    /// Take back the notification queued for `err`.
    ///
    /// Used when the error itself is the response, so the next view does not
    /// show the message a second time.
    #[must_use]
    pub fn answered(&self, err: ProfileError) -> ProfileError {
        self.notifications
            .withdraw(NotificationKind::Error, &err.user_message());
        err
    }

    /// Render the current state and hand over queued notifications.
    pub fn view<B: BlobStore>(&self, avatars: &AvatarResolver<B>) -> AccountView {
        let notifications = self.notifications.drain();
        self.with(|ws| {
            let avatar_url = avatars.resolve(ws.profile());
            AccountView::new(ws, avatar_url.as_ref(), notifications)
        })
    }
}
