//! Account route handlers.
//!
//! Every handler answers with the rendered [`AccountView`], so a client can
//! redraw after any step. These routes require authentication.

use axum::{
    Json,
    extract::{Multipart, State},
    http::HeaderMap,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use clubhouse_core::workspace::Workspace;
use clubhouse_core::{FormPatch, PendingImage, ProfileError};

use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::models::{AccountView, CurrentUser};
use crate::services::profile::{
    self, IdentityResolver, ProfileSession, TowerSessionProvider, surface,
};
use crate::state::AppState;

/// Multipart field carrying the avatar image.
const AVATAR_FIELD: &str = "avatar";

/// Club toggle request body.
#[derive(Debug, Deserialize)]
pub struct ToggleClubRequest {
    pub club: String,
}

/// Mount the workspace and render it.
#[instrument(skip(state, headers, session), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    session: Session,
) -> Result<Json<AccountView>> {
    set_sentry_user(&user.id, user.email.as_deref());

    let profile_session = state.profile_session(user.id).await;
    let resolver = IdentityResolver::new(TowerSessionProvider::new(session), state.profiles());
    profile::mount(&profile_session, &resolver)
        .await
        .map_err(|e| reject(&profile_session, &headers, e))?;

    Ok(Json(profile_session.view(&state.avatars())))
}

/// Switch from Viewing to Editing.
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Json<AccountView>> {
    let view = apply(&state, &user, &headers, Workspace::begin_edit).await?;
    add_breadcrumb("profile", "Began editing", None);
    Ok(view)
}

/// Apply a partial form update.
pub async fn update_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(patch): Json<FormPatch>,
) -> Result<Json<AccountView>> {
    apply(&state, &user, &headers, |ws| ws.edit_form(patch)).await
}

/// Toggle one club in the selection.
pub async fn toggle_club(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(request): Json<ToggleClubRequest>,
) -> Result<Json<AccountView>> {
    apply(&state, &user, &headers, |ws| ws.toggle_club(&request.club)).await
}

/// Stage the uploaded image as the pending avatar.
pub async fn stage_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AccountView>> {
    let image = read_avatar(multipart).await?;
    apply(&state, &user, &headers, |ws| ws.stage_image(image)).await
}

/// Upload the staged avatar, persist the profile and apply the result.
#[instrument(skip(state, headers), fields(user_id = %user.id))]
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Json<AccountView>> {
    add_breadcrumb("profile", "Save requested", None);

    let profile_session = state.profile_session(user.id).await;
    profile::save(&profile_session, &state.save_coordinator())
        .await
        .map_err(|e| reject(&profile_session, &headers, e))?;

    Ok(Json(profile_session.view(&state.avatars())))
}

/// Discard the workspace. Results still in flight are ignored.
pub async fn leave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Json<AccountView>> {
    apply(&state, &user, &headers, |ws| {
        ws.unmount();
        Ok::<_, ProfileError>(())
    })
    .await
}

/// Run one synchronous workspace step and render the result.
async fn apply<R>(
    state: &AppState,
    user: &CurrentUser,
    headers: &HeaderMap,
    step: impl FnOnce(&mut Workspace) -> std::result::Result<R, ProfileError>,
) -> Result<Json<AccountView>> {
    let profile_session = state.profile_session(user.id).await;
    surface(profile_session.notifications(), profile_session.with(step))
        .map_err(|e| reject(&profile_session, headers, e))?;
    Ok(Json(profile_session.view(&state.avatars())))
}

/// Turn a failed step into the response. Its message goes out in the body,
/// not in the next view.
fn reject(profile_session: &ProfileSession, headers: &HeaderMap, err: ProfileError) -> AppError {
    AppError::from(profile_session.answered(err)).negotiate(headers)
}

async fn read_avatar(mut multipart: Multipart) -> Result<PendingImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok(PendingImage {
            content_type,
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest(format!("missing `{AVATAR_FIELD}` field")))
}
