//! Render mode of the profile page.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::profile::{Profile, is_complete};

/// How the profile page is shown.
///
/// ```text
/// Registering --save ok--> Viewing --edit--> Editing --save ok--> Viewing
///                                             |  ^
///                                             +--+ save failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMode {
    /// No complete profile yet; the full form is always open.
    Registering,
    /// Read-only display of a complete profile.
    Viewing,
    /// Avatar and clubs are open for changes; identity fields are frozen.
    Editing,
}

/// User or workflow event that may change the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeEvent {
    BeginEdit,
    Save,
}

impl fmt::Display for ModeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginEdit => f.write_str("edit"),
            Self::Save => f.write_str("save"),
        }
    }
}

impl ProfileMode {
    /// Initial mode for a freshly resolved row.
    #[must_use]
    pub fn initial_for(profile: Option<&Profile>) -> Self {
        if is_complete(profile) {
            Self::Viewing
        } else {
            Self::Registering
        }
    }

    /// Whether the form and pending image accept changes.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Registering | Self::Editing)
    }

    /// Whether identity scalars (names, dates, contact details) accept changes.
    #[must_use]
    pub const fn identity_editable(self) -> bool {
        matches!(self, Self::Registering)
    }

    /// Mode after the user asks to edit. Only Viewing moves; Editing stays.
    #[must_use]
    pub const fn begin_edit(self) -> Option<Self> {
        match self {
            Self::Viewing | Self::Editing => Some(Self::Editing),
            Self::Registering => None,
        }
    }

    /// Mode after a successful save.
    #[must_use]
    pub const fn after_save(self) -> Option<Self> {
        match self {
            Self::Registering | Self::Editing => Some(Self::Viewing),
            Self::Viewing => None,
        }
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registering => f.write_str("registering"),
            Self::Viewing => f.write_str("viewing"),
            Self::Editing => f.write_str("editing"),
        }
    }
}
