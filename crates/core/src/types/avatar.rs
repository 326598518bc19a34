//! Avatar storage references and pending uploads.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProfileId;

/// Opaque reference to an avatar object in blob storage.
///
/// This is the storage path (e.g. `public/<profile id>`), never a URL and
/// never the image bytes. Turning it into something displayable is the job
/// of the blob store's public URL lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarRef(String);

impl AvatarRef {
    /// Wrap a reference returned by the blob store or read from the database.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Storage key for a profile's avatar.
    ///
    /// The key is scoped to the profile, not to the upload, so every upload
    /// for the same profile replaces the previous object.
    #[must_use]
    pub fn key_for(profile_id: ProfileId) -> String {
        format!("public/{profile_id}")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AvatarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AvatarRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An image chosen by the user but not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingImage {
    /// MIME type reported by the client, e.g. `image/png`.
    pub content_type: String,
    /// Original file name, for logs only.
    pub file_name: Option<String>,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl PendingImage {
    /// Largest accepted avatar upload (5 MiB).
    pub const MAX_BYTES: usize = 5 * 1024 * 1024;

    /// Size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep image bytes out of logs.
impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
