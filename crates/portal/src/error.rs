//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use clubhouse_core::ProfileError;

use crate::middleware::auth::AuthRejection;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Profile workflow step failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The user is no longer signed in.
    #[error("Signed out")]
    SignedOut(AuthRejection),
}

impl AppError {
    /// Answer auth failures the way [`RequireAuth`] does for this request.
    ///
    /// [`RequireAuth`]: crate::middleware::RequireAuth
    #[must_use]
    pub fn negotiate(self, headers: &HeaderMap) -> Self {
        match self {
            Self::Profile(err) if err.is_auth() => {
                Self::SignedOut(AuthRejection::for_headers(headers))
            }
            other => other,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Profile(err) => match err {
                ProfileError::SignedOut | ProfileError::Auth(_) => StatusCode::UNAUTHORIZED,
                ProfileError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ProfileError::InvalidTransition { .. }
                | ProfileError::SaveInProgress
                | ProfileError::NotMounted
                | ProfileError::ReadOnlyField(_) => StatusCode::CONFLICT,
                ProfileError::UnknownClub(_) | ProfileError::InvalidImage(_) => {
                    StatusCode::BAD_REQUEST
                }
                ProfileError::Fetch(_) | ProfileError::Upload(_) | ProfileError::Persist(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SignedOut(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture collaborator failures to Sentry
        if let Self::Profile(err) = &self
            && err.is_remote()
        {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Auth failures end the view
        let rejection = match &self {
            Self::SignedOut(rejection) => Some(*rejection),
            Self::Profile(err) if err.is_auth() => Some(AuthRejection::RedirectHome),
            _ => None,
        };
        if let Some(rejection) = rejection {
            return rejection.into_response();
        }

        // Don't expose collaborator details to clients
        let message = match &self {
            Self::Profile(err) => err.user_message(),
            Self::BadRequest(_) | Self::SignedOut(_) => self.to_string(),
        };

        (self.status(), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the identity is known to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header};
    use clubhouse_core::{ModeEvent, ProfileMode, RequiredField, ValidationError};

    use super::*;
    use crate::middleware::auth::ANONYMOUS_HOME;

    #[derive(Debug, Error)]
    #[error("pool timed out")]
    struct PoolTimeout;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(ProfileError::Validation(ValidationError::MissingFields(vec![
                RequiredField::Phone
            ]))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(ProfileError::InvalidTransition {
                mode: ProfileMode::Viewing,
                event: ModeEvent::Save,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(ProfileError::SaveInProgress), StatusCode::CONFLICT);
        assert_eq!(
            get_status(ProfileError::UnknownClub("Chess".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ProfileError::persist(PoolTimeout)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::BadRequest("no file".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_signed_out_redirects_home() {
        let response = AppError::from(ProfileError::SignedOut).into_response();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], ANONYMOUS_HOME);
    }

    #[test]
    fn test_signed_out_json_client_gets_401() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let response = AppError::from(ProfileError::SignedOut)
            .negotiate(&headers)
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::from(ProfileError::SignedOut)
            .negotiate(&HeaderMap::new())
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], ANONYMOUS_HOME);
    }

    #[test]
    fn test_negotiate_keeps_other_errors() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let err = AppError::from(ProfileError::SaveInProgress).negotiate(&headers);
        assert!(matches!(err, AppError::Profile(ProfileError::SaveInProgress)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing avatar field".to_string());
        assert_eq!(err.to_string(), "Bad request: missing avatar field");
    }
}
