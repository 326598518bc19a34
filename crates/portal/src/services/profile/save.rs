//! Save coordination: validate, upload, persist.

use tracing::{info, instrument, warn};

use clubhouse_core::ports::{BlobStore, ProfileStore};
use clubhouse_core::workspace::SaveRequest;
use clubhouse_core::{
    AvatarRef, Profile, ProfileError, ProfileMode, ProfileUpdate, RequiredField, ValidationError,
};

/// Runs one save against the blob store and the profile store.
///
/// Steps run strictly in order and stop at the first failure:
///
/// 1. validate the form, including the select options while registering
///    (no I/O on failure)
/// 2. upload the pending image, if any, under `public/<profile id>`
/// 3. upsert the row with the selected clubs and the resolved avatar
///
/// The coordinator does not touch workspace state. Applying the result is
/// the caller's job, so a failure leaves the user's edits where they were.
pub struct SaveCoordinator<B, P> {
    blobs: B,
    profiles: P,
}

impl<B, P> SaveCoordinator<B, P>
where
    B: BlobStore,
    P: ProfileStore,
{
    #[must_use]
    pub const fn new(blobs: B, profiles: P) -> Self {
        Self { blobs, profiles }
    }

    /// Save a workspace snapshot and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any I/O, `Upload` if the image cannot be
    /// stored (the row is then not touched) and `Persist` if the upsert
    /// fails.
    #[instrument(
        skip(self, request),
        fields(profile_id = %request.profile_id, mode = %request.mode, image = request.pending_image.is_some())
    )]
    pub async fn save(&self, request: &SaveRequest) -> Result<Profile, ProfileError> {
        let registering = request.mode == ProfileMode::Registering;
        let identity = if registering {
            request.form.validate_registration()?
        } else {
            request.form.validate()?
        };

        let previous = request
            .current
            .as_ref()
            .and_then(|p| p.avatar.clone())
            .filter(|a| !a.as_str().is_empty());

        if registering
            && request.pending_image.is_none()
            && previous.is_none()
        {
            return Err(ValidationError::MissingFields(vec![RequiredField::Avatar]).into());
        }

        let (avatar, uploaded) = match &request.pending_image {
            Some(image) => {
                let key = AvatarRef::key_for(request.profile_id);
                let reference = self
                    .blobs
                    .upload(&key, image)
                    .await
                    .map_err(ProfileError::upload)?;
                (Some(reference), true)
            }
            None => (previous, false),
        };

        // Identity columns are frozen once registration is done.
        let identity = registering.then_some(identity);

        let update = ProfileUpdate::new(
            request.profile_id,
            request.owner,
            &request.form.clubs,
            avatar,
            identity,
        );

        match self.profiles.upsert(&update).await {
            Ok(stored) => {
                info!(clubs = stored.clubs.len(), "Profile persisted");
                Ok(stored)
            }
            Err(e) => {
                if uploaded {
                    warn!(
                        key = %AvatarRef::key_for(request.profile_id),
                        "Avatar uploaded but profile not saved; object left in storage"
                    );
                }
                Err(ProfileError::persist(e))
            }
        }
    }
}
