//! Authentication extractors.
//!
//! Sign-in itself happens elsewhere; these only read what it left in the
//! session.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::ACCEPT, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Where signed-out users are sent.
pub const ANONYMOUS_HOME: &str = "/";

/// Extractor that requires a signed-in user.
///
/// If no one is signed in, browsers are redirected to the anonymous home
/// page and JSON clients get `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but no one is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to the anonymous home page (for browser requests).
    RedirectHome,
    /// Unauthorized response (for JSON clients).
    Unauthorized,
}

impl AuthRejection {
    /// Pick the rejection style for a request.
    #[must_use]
    pub fn for_headers(headers: &HeaderMap) -> Self {
        let wants_json = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));
        if wants_json {
            Self::Unauthorized
        } else {
            Self::RedirectHome
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to(ANONYMOUS_HOME).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AuthRejection::for_headers(&parts.headers))?;

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the signed-in user from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_rejection_style() {
        let mut headers = HeaderMap::new();
        assert_eq!(AuthRejection::for_headers(&headers), AuthRejection::RedirectHome);

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert_eq!(AuthRejection::for_headers(&headers), AuthRejection::Unauthorized);
    }

    #[test]
    fn test_redirect_target() {
        let response = AuthRejection::RedirectHome.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], ANONYMOUS_HOME);
    }
}
