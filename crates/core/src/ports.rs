//! Collaborator traits.
//!
//! The workflow reaches the outside world only through these traits. Each is
//! passed in explicitly; nothing is looked up from a global.

use core::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{AvatarRef, Identity, PendingImage, Profile, ProfileUpdate, UserId};

/// Reads the signed-in identity from the current session.
pub trait SessionProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The signed-in identity, or `None` when no one is signed in.
    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send;
}

/// Relational store holding one profile row per identity.
pub trait ProfileStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The row owned by `user_id`, or `None` if it has not been created yet.
    fn select_by_identity(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send;

    /// Insert or update the row keyed by `update.id` and return the stored row.
    fn upsert(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<Profile, Self::Error>> + Send;
}

/// Blob storage for avatar images.
pub trait BlobStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `image` under `key`, replacing any object already there.
    fn upload(
        &self,
        key: &str,
        image: &PendingImage,
    ) -> impl Future<Output = Result<AvatarRef, Self::Error>> + Send;

    /// Public URL for a stored reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference cannot be turned into a URL.
    fn public_url(&self, reference: &AvatarRef) -> Result<Url, Self::Error>;
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Fire-and-forget channel for transient user notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

impl<T: SessionProvider> SessionProvider for &T {
    type Error = T::Error;

    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send {
        (**self).current_user()
    }
}

impl<T: ProfileStore> ProfileStore for &T {
    type Error = T::Error;

    fn select_by_identity(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send {
        (**self).select_by_identity(user_id)
    }

    fn upsert(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<Profile, Self::Error>> + Send {
        (**self).upsert(update)
    }
}

impl<T: BlobStore> BlobStore for &T {
    type Error = T::Error;

    fn upload(
        &self,
        key: &str,
        image: &PendingImage,
    ) -> impl Future<Output = Result<AvatarRef, Self::Error>> + Send {
        (**self).upload(key, image)
    }

    fn public_url(&self, reference: &AvatarRef) -> Result<Url, Self::Error> {
        (**self).public_url(reference)
    }
}

impl<T: NotificationSink> NotificationSink for &T {
    fn notify(&self, kind: NotificationKind, message: &str) {
        (**self).notify(kind, message);
    }
}
