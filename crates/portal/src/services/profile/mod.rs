//! Profile workflow service.
//!
//! Drives a [`ProfileSession`] through mount and save. Each asynchronous step
//! is bracketed by a `begin_*`/`finish_*` pair on the workspace, with the
//! collaborator call in between and no lock held across it.

pub mod avatar;
pub mod identity;
pub mod notify;
pub mod save;
pub mod session;

pub use avatar::AvatarResolver;
pub use identity::{IdentityResolver, SessionError, TowerSessionProvider};
pub use notify::{NotificationBuffer, SAVE_SUCCESS};
pub use save::SaveCoordinator;
pub use session::ProfileSession;

use clubhouse_core::ProfileError;
use clubhouse_core::ports::{
    BlobStore, NotificationKind, NotificationSink, ProfileStore, SessionProvider,
};
use clubhouse_core::workspace::{MountOutcome, SaveOutcome, Workspace};

/// Emit one error notification for a failed step and pass the result on.
///
/// # Errors
///
/// Returns `result` unchanged.
pub fn surface<T>(
    notifier: &impl NotificationSink,
    result: Result<T, ProfileError>,
) -> Result<T, ProfileError> {
    if let Err(e) = &result {
        notifier.notify(NotificationKind::Error, &e.user_message());
    }
    result
}

/// Resolve identity and row, then classify and seed the workspace.
///
/// # Errors
///
/// Returns the resolution error if this mount is still the latest one.
pub async fn mount<S, P>(
    session: &ProfileSession,
    resolver: &IdentityResolver<S, P>,
) -> Result<MountOutcome, ProfileError>
where
    S: SessionProvider,
    P: ProfileStore,
{
    let ticket = session.with(Workspace::begin_mount);
    let result = resolver.resolve().await;
    let outcome = session.with(|ws| ws.finish_mount(ticket, result));
    surface(session.notifications(), outcome)
}

/// Run one save and apply its result.
///
/// # Errors
///
/// Returns `SaveInProgress` or a mode error if the save cannot start, or the
/// coordinator's error if the save is still current when it fails.
pub async fn save<B, P>(
    session: &ProfileSession,
    coordinator: &SaveCoordinator<B, P>,
) -> Result<SaveOutcome, ProfileError>
where
    B: BlobStore,
    P: ProfileStore,
{
    let request = surface(session.notifications(), session.with(Workspace::begin_save))?;
    let mut gate = SaveGate {
        session,
        open: false,
    };

    let result = coordinator.save(&request).await;
    let outcome = session.with(|ws| ws.finish_save(request.ticket, result));
    gate.open = true;

    if matches!(outcome, Ok(SaveOutcome::Saved(_))) {
        session
            .notifications()
            .notify(NotificationKind::Success, SAVE_SUCCESS);
    }
    surface(session.notifications(), outcome)
}

/// Reopens the save gate if the save future is dropped mid-flight.
struct SaveGate<'a> {
    session: &'a ProfileSession,
    open: bool,
}

impl Drop for SaveGate<'_> {
    fn drop(&mut self) {
        if !self.open {
            self.session.with(Workspace::abandon_save);
        }
    }
}
