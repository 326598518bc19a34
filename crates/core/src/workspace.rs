//! Per-user profile workflow state.
//!
//! A [`Workspace`] holds everything the profile page needs between events:
//! the last fetched row, the render mode, the editable form, a pending
//! avatar image and the save gate. It performs no I/O. Callers split every
//! asynchronous step into a `begin_*` call that hands out a [`Ticket`] and a
//! `finish_*` call that applies the result only if the ticket is still
//! current.
//!
//! # Stale results
//!
//! Every mount and unmount bumps the generation. A resolution or save that
//! completes under an older generation is dropped without touching state,
//! so a slow fetch cannot overwrite what a newer mount already showed.

use tracing::{debug, info, warn};

use crate::error::ProfileError;
use crate::types::{
    ClubSet, FormPatch, Identity, ModeEvent, PendingImage, Profile, ProfileForm, ProfileId,
    ProfileMode, UserId, is_complete, is_directory_club,
};

/// Generation token handed out by `begin_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Result of resolving the signed-in identity and its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: Identity,
    pub profile: Option<Profile>,
}

/// What `finish_mount` did with a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The resolution replaced the workspace contents.
    Applied(ProfileMode),
    /// The resolution looked incomplete but a complete row is already known
    /// for this identity, so that row was kept.
    Retained(ProfileMode),
    /// A newer mount or an unmount superseded this one.
    Stale,
}

/// What `finish_save` did with a save result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(ProfileMode),
    /// The workspace was unmounted or remounted while the save ran.
    Discarded,
}

/// Snapshot handed to the save coordinator.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: Ticket,
    pub mode: ProfileMode,
    pub owner: UserId,
    /// Row key: the existing row's id, or a draft id for a first save.
    pub profile_id: ProfileId,
    pub form: ProfileForm,
    pub pending_image: Option<PendingImage>,
    pub current: Option<Profile>,
}

/// Profile workflow state for one signed-in user.
#[derive(Debug)]
pub struct Workspace {
    generation: u64,
    loading: bool,
    owner: Option<UserId>,
    profile: Option<Profile>,
    mode: Option<ProfileMode>,
    form: ProfileForm,
    pending_image: Option<PendingImage>,
    // Key for a row that does not exist yet. Stable across retries so a
    // re-upload lands on the same object.
    draft_id: ProfileId,
    saving: bool,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generation: 0,
            loading: false,
            owner: None,
            profile: None,
            mode: None,
            form: ProfileForm::default(),
            pending_image: None,
            draft_id: ProfileId::generate(),
            saving: false,
        }
    }

    /// Start resolving the identity and row. Supersedes any earlier mount.
    pub fn begin_mount(&mut self) -> Ticket {
        self.generation += 1;
        self.loading = true;
        debug!(generation = self.generation, "Mount started");
        Ticket(self.generation)
    }

    /// Apply a resolution started by `begin_mount`.
    ///
    /// # Errors
    ///
    /// Returns the resolution's error if it is still current. The workspace
    /// keeps its previous row and mode in that case.
    pub fn finish_mount(
        &mut self,
        ticket: Ticket,
        result: Result<Resolution, ProfileError>,
    ) -> Result<MountOutcome, ProfileError> {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, generation = self.generation, "Dropping stale resolution");
            return Ok(MountOutcome::Stale);
        }
        self.loading = false;

        let Resolution { identity, profile } = result?;

        if self.owner != Some(identity.id) {
            self.owner = Some(identity.id);
            self.profile = None;
            self.draft_id = ProfileId::generate();
            self.pending_image = None;
        }

        // A complete row never regresses because a later read came back
        // empty or partial.
        if is_complete(self.profile.as_ref()) && !is_complete(profile.as_ref()) {
            warn!(user_id = %identity.id, "Resolution is incomplete for a completed profile; keeping known row");
            self.reseed(ProfileMode::Viewing);
            return Ok(MountOutcome::Retained(ProfileMode::Viewing));
        }

        let mode = ProfileMode::initial_for(profile.as_ref());
        self.profile = profile;
        self.reseed(mode);
        info!(user_id = %identity.id, %mode, "Profile mounted");
        Ok(MountOutcome::Applied(mode))
    }

    /// Leave the page. Results still in flight will be dropped.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.mode = None;
        self.pending_image = None;
        debug!(generation = self.generation, "Unmounted");
    }

    /// Viewing → Editing. No network call is involved.
    ///
    /// # Errors
    ///
    /// Returns `NotMounted` before a successful mount and `InvalidTransition`
    /// while registering.
    pub fn begin_edit(&mut self) -> Result<ProfileMode, ProfileError> {
        let mode = self.mode.ok_or(ProfileError::NotMounted)?;
        let next = mode.begin_edit().ok_or(ProfileError::InvalidTransition {
            mode,
            event: ModeEvent::BeginEdit,
        })?;
        self.mode = Some(next);
        Ok(next)
    }

    /// Apply a partial form update.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyField` when identity fields are changed outside
    /// registration, or a mode error when the form is not open.
    pub fn edit_form(&mut self, patch: FormPatch) -> Result<(), ProfileError> {
        let mode = self.editable_mode(ModeEvent::BeginEdit)?;
        let touched = patch.touched();
        if !mode.identity_editable() && !touched.is_empty() {
            return Err(ProfileError::ReadOnlyField(touched.join(", ")));
        }
        self.form.apply(patch);
        Ok(())
    }

    /// Toggle club membership in the form.
    ///
    /// # Errors
    ///
    /// Returns `UnknownClub` for a name that is neither in the directory nor
    /// already selected, or a mode error when the form is not open.
    pub fn toggle_club(&mut self, name: &str) -> Result<ClubSet, ProfileError> {
        self.editable_mode(ModeEvent::BeginEdit)?;
        // Selected names outside the directory may still be removed.
        if !is_directory_club(name) && !self.form.clubs.contains(name) {
            return Err(ProfileError::UnknownClub(name.to_owned()));
        }
        Ok(self.form.toggle_club(name).clone())
    }

    /// Stage an avatar to be uploaded by the next save.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` for empty, oversized or non-image uploads.
    pub fn stage_image(&mut self, image: PendingImage) -> Result<(), ProfileError> {
        self.editable_mode(ModeEvent::BeginEdit)?;
        if image.is_empty() {
            return Err(ProfileError::InvalidImage("file is empty".to_owned()));
        }
        if image.len() > PendingImage::MAX_BYTES {
            return Err(ProfileError::InvalidImage(format!(
                "file is larger than {} bytes",
                PendingImage::MAX_BYTES
            )));
        }
        if !image.content_type.starts_with("image/") {
            return Err(ProfileError::InvalidImage(format!(
                "unsupported content type {}",
                image.content_type
            )));
        }
        self.pending_image = Some(image);
        Ok(())
    }

    /// Close the save gate and snapshot what the coordinator needs.
    ///
    /// # Errors
    ///
    /// Returns `SaveInProgress` while an earlier save has not finished, or a
    /// mode error outside Registering/Editing.
    pub fn begin_save(&mut self) -> Result<SaveRequest, ProfileError> {
        let mode = self.editable_mode(ModeEvent::Save)?;
        let owner = self.owner.ok_or(ProfileError::NotMounted)?;
        if self.saving {
            return Err(ProfileError::SaveInProgress);
        }
        self.saving = true;

        Ok(SaveRequest {
            ticket: Ticket(self.generation),
            mode,
            owner,
            profile_id: self.profile.as_ref().map_or(self.draft_id, |p| p.id),
            form: self.form.clone(),
            pending_image: self.pending_image.clone(),
            current: self.profile.clone(),
        })
    }

    /// Apply the coordinator's result and reopen the save gate.
    ///
    /// On success the stored row replaces the local one wholesale and the
    /// form is reseeded from it. On failure nothing changes, so the user can
    /// retry without re-entering data.
    ///
    /// # Errors
    ///
    /// Returns the save's error if the request is still current.
    pub fn finish_save(
        &mut self,
        ticket: Ticket,
        result: Result<Profile, ProfileError>,
    ) -> Result<SaveOutcome, ProfileError> {
        self.saving = false;
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, generation = self.generation, "Dropping stale save result");
            return Ok(SaveOutcome::Discarded);
        }

        let saved = result?;
        // Reads started before this save would bring back the pre-save row.
        self.generation += 1;
        self.loading = false;
        let mode = self
            .mode
            .and_then(ProfileMode::after_save)
            .unwrap_or(ProfileMode::Viewing);
        self.profile = Some(saved);
        self.reseed(mode);
        info!(%mode, "Profile saved");
        Ok(SaveOutcome::Saved(mode))
    }

    /// Reopen the save gate for a save whose result will never arrive,
    /// e.g. because the request driving it was dropped.
    pub fn abandon_save(&mut self) {
        if self.saving {
            warn!("Save abandoned before completion");
        }
        self.saving = false;
    }

    #[must_use]
    pub const fn mode(&self) -> Option<ProfileMode> {
        self.mode
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub const fn form(&self) -> &ProfileForm {
        &self.form
    }

    #[must_use]
    pub const fn pending_image(&self) -> Option<&PendingImage> {
        self.pending_image.as_ref()
    }

    #[must_use]
    pub const fn owner(&self) -> Option<UserId> {
        self.owner
    }

    /// Key the next save will write under.
    #[must_use]
    pub fn profile_id(&self) -> ProfileId {
        self.profile.as_ref().map_or(self.draft_id, |p| p.id)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    fn editable_mode(&self, event: ModeEvent) -> Result<ProfileMode, ProfileError> {
        let mode = self.mode.ok_or(ProfileError::NotMounted)?;
        if mode.is_editable() {
            Ok(mode)
        } else {
            Err(ProfileError::InvalidTransition { mode, event })
        }
    }

    fn reseed(&mut self, mode: ProfileMode) {
        self.form = ProfileForm::from_profile(self.profile.as_ref());
        self.pending_image = None;
        self.mode = Some(mode);
    }
}
