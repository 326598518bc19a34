//! Avatar URL resolution.

use tracing::warn;
use url::Url;

use clubhouse_core::Profile;
use clubhouse_core::ports::BlobStore;

/// Turns a profile's stored avatar reference into a public URL.
///
/// Computed per render and never cached. A failed lookup degrades to `None`
/// so the page still renders with the placeholder.
pub struct AvatarResolver<B> {
    blobs: B,
}

impl<B: BlobStore> AvatarResolver<B> {
    #[must_use]
    pub const fn new(blobs: B) -> Self {
        Self { blobs }
    }

    #[must_use]
    pub fn resolve(&self, profile: Option<&Profile>) -> Option<Url> {
        let profile = profile?;
        let reference = profile.avatar.as_ref().filter(|a| !a.as_str().is_empty())?;

        match self.blobs.public_url(reference) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(
                    profile_id = %profile.id,
                    avatar = %reference,
                    error = %e,
                    "Could not resolve avatar URL; using placeholder"
                );
                None
            }
        }
    }
}
