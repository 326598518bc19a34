//! Session-related types.
//!
//! The sign-in flow is external to the portal; it writes [`CurrentUser`]
//! under [`keys::CURRENT_USER`] and the portal only reads it.

use serde::{Deserialize, Serialize};

use clubhouse_core::{Identity, UserId};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity issued by the sign-in provider.
    pub id: UserId,
    /// Email the user signed in with, if known.
    #[serde(default)]
    pub email: Option<String>,
}

impl From<CurrentUser> for Identity {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
