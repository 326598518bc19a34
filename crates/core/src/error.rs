//! Profile workflow errors.

use thiserror::Error;

use crate::types::{ModeEvent, ProfileMode, RequiredField};

/// Boxed collaborator error kept as the `source` of a [`ProfileError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A save was refused before any I/O happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are empty.
    #[error("Please fill in all details (missing: {})", join_fields(.0))]
    MissingFields(Vec<RequiredField>),

    /// A field is present but cannot be interpreted.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: RequiredField,
        reason: String,
    },
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors surfaced by the profile workflow.
///
/// None of these are fatal to the process; every one is recoverable by the
/// user retrying. Auth failures end the current view.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No one is signed in.
    #[error("Not signed in")]
    SignedOut,

    /// The session could not be read.
    #[error("Session unavailable: {0}")]
    Auth(#[source] BoxError),

    /// The profile row could not be read.
    #[error("Failed to load profile: {0}")]
    Fetch(#[source] BoxError),

    /// Required input missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The avatar image could not be stored.
    #[error("Failed to upload avatar: {0}")]
    Upload(#[source] BoxError),

    /// The profile row could not be written.
    #[error("Failed to save profile: {0}")]
    Persist(#[source] BoxError),

    /// The requested action is not allowed in the current mode.
    #[error("Cannot {event} while {mode}")]
    InvalidTransition { mode: ProfileMode, event: ModeEvent },

    /// Another save for this profile has not finished yet.
    #[error("A save is already in progress")]
    SaveInProgress,

    /// No profile has been loaded into the workspace.
    #[error("Profile is not loaded")]
    NotMounted,

    /// Identity fields are frozen once the profile is complete.
    #[error("Cannot change {0} after registration")]
    ReadOnlyField(String),

    /// The club is neither in the directory nor currently selected.
    #[error("Unknown club: {0}")]
    UnknownClub(String),

    /// The staged avatar is not an acceptable image.
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl ProfileError {
    pub fn auth(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Auth(Box::new(err))
    }

    pub fn fetch(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Fetch(Box::new(err))
    }

    pub fn upload(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Upload(Box::new(err))
    }

    pub fn persist(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persist(Box::new(err))
    }

    /// Text shown to the user. Collaborator details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::MissingFields(_)) => {
                "Please fill in all details".to_owned()
            }
            Self::Auth(_) => "Session unavailable".to_owned(),
            Self::Fetch(_) => "Failed to load profile".to_owned(),
            Self::Upload(_) => "Failed to upload avatar".to_owned(),
            Self::Persist(_) => "Failed to save profile".to_owned(),
            other => other.to_string(),
        }
    }

    /// True for errors that end the view and send the user to the anonymous
    /// state.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::SignedOut | Self::Auth(_))
    }

    /// True for failures of a remote collaborator (as opposed to local
    /// validation or workflow misuse).
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Fetch(_) | Self::Upload(_) | Self::Persist(_)
        )
    }
}
