//! Identity resolution: who is signed in, and which row is theirs.

use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, instrument};

use clubhouse_core::ProfileError;
use clubhouse_core::ports::{ProfileStore, SessionProvider};
use clubhouse_core::types::Identity;
use clubhouse_core::workspace::Resolution;

use crate::models::{CurrentUser, session_keys};

/// Errors reading the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),
}

/// Session provider backed by the request's tower-sessions handle.
#[derive(Clone)]
pub struct TowerSessionProvider {
    session: Session,
}

impl TowerSessionProvider {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl SessionProvider for TowerSessionProvider {
    type Error = SessionError;

    async fn current_user(&self) -> Result<Option<Identity>, Self::Error> {
        let user: Option<CurrentUser> = self.session.get(session_keys::CURRENT_USER).await?;
        Ok(user.map(Identity::from))
    }
}

/// Resolves the signed-in identity and its profile row.
pub struct IdentityResolver<S, P> {
    sessions: S,
    profiles: P,
}

impl<S, P> IdentityResolver<S, P>
where
    S: SessionProvider,
    P: ProfileStore,
{
    #[must_use]
    pub const fn new(sessions: S, profiles: P) -> Self {
        Self { sessions, profiles }
    }

    /// Read the session, then the row owned by that identity.
    ///
    /// A missing row is not an error; it is the normal state of a new user.
    ///
    /// # Errors
    ///
    /// Returns `SignedOut` if no one is signed in, `Auth` if the session
    /// cannot be read and `Fetch` if the row cannot be read.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<Resolution, ProfileError> {
        let identity = self
            .sessions
            .current_user()
            .await
            .map_err(ProfileError::auth)?
            .ok_or(ProfileError::SignedOut)?;

        let profile = self
            .profiles
            .select_by_identity(identity.id)
            .await
            .map_err(ProfileError::fetch)?;

        debug!(user_id = %identity.id, found = profile.is_some(), "Identity resolved");
        Ok(Resolution { identity, profile })
    }
}
