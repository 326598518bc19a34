//! JSON view of the account page.

use serde::{Deserialize, Serialize};
use url::Url;

use clubhouse_core::ports::NotificationKind;
use clubhouse_core::workspace::Workspace;
use clubhouse_core::{
    BRANCH_OPTIONS, CLUB_DIRECTORY, DEGREE_OPTIONS, GENDER_OPTIONS, PendingImage, ProfileForm,
    ProfileId, ProfileMode, YEAR_OPTIONS,
};

/// Shown when a profile has no avatar or its URL cannot be resolved.
pub const PLACEHOLDER_AVATAR: &str = "/images/default-avatar.png";

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Metadata of the staged avatar. The bytes never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImageSummary {
    pub content_type: String,
    pub file_name: Option<String>,
    pub size: usize,
}

impl From<&PendingImage> for PendingImageSummary {
    fn from(image: &PendingImage) -> Self {
        Self {
            content_type: image.content_type.clone(),
            file_name: image.file_name.clone(),
            size: image.len(),
        }
    }
}

/// Choices offered by the registration selects.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SelectOptions {
    pub gender: &'static [&'static str],
    pub year: &'static [&'static str],
    pub degree: &'static [&'static str],
    pub branch: &'static [&'static str],
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            gender: GENDER_OPTIONS,
            year: YEAR_OPTIONS,
            degree: DEGREE_OPTIONS,
            branch: BRANCH_OPTIONS,
        }
    }
}

/// Everything the account page renders.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    /// `None` until the first mount completes.
    pub mode: Option<ProfileMode>,
    pub profile_id: ProfileId,
    pub form: ProfileForm,
    pub clubs: Vec<String>,
    pub directory: &'static [&'static str],
    pub options: SelectOptions,
    pub avatar_url: String,
    pub pending_image: Option<PendingImageSummary>,
    pub saving: bool,
    pub notifications: Vec<Notification>,
}

impl AccountView {
    /// Snapshot a workspace.
    #[must_use]
    pub fn new(
        workspace: &Workspace,
        avatar_url: Option<&Url>,
        notifications: Vec<Notification>,
    ) -> Self {
        let form = workspace.form().clone();
        Self {
            mode: workspace.mode(),
            profile_id: workspace.profile_id(),
            clubs: form.clubs.to_vec(),
            form,
            directory: CLUB_DIRECTORY,
            options: SelectOptions::default(),
            avatar_url: avatar_url.map_or_else(|| PLACEHOLDER_AVATAR.to_owned(), Url::to_string),
            pending_image: workspace.pending_image().map(PendingImageSummary::from),
            saving: workspace.is_saving(),
            notifications,
        }
    }
}
