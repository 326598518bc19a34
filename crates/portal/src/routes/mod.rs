//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                  - Liveness check
//! GET   /health/ready            - Readiness check (database)
//!
//! # Account (signed-in users)
//! GET   /account                 - Mount and render the profile
//! POST  /account/edit            - Switch Viewing to Editing
//! PATCH /account/form            - Update form fields
//! POST  /account/clubs/toggle    - Select or deselect a club
//! POST  /account/avatar          - Stage an avatar image (multipart)
//! POST  /account/save            - Upload the avatar and persist the profile
//! POST  /account/leave           - Discard the workspace
//! ```

pub mod account;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use clubhouse_core::PendingImage;

use crate::state::AppState;

/// Room for multipart framing around the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show))
        .route("/edit", post(account::edit))
        .route("/form", patch(account::update_form))
        .route("/clubs/toggle", post(account::toggle_club))
        .route(
            "/avatar",
            post(account::stage_avatar)
                .layer(DefaultBodyLimit::max(PendingImage::MAX_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/save", post(account::save))
        .route("/leave", post(account::leave))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/account", account_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};
    use url::Url;

    use super::*;
    use crate::config::{PortalConfig, StorageConfig};

    fn app() -> Router {
        let config = PortalConfig {
            database_url: SecretString::from("postgres://localhost/clubhouse"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            storage: StorageConfig {
                url: Url::parse("https://project.supabase.co").unwrap(),
                service_key: SecretString::from("k9$Lq2!vT7@pZ4#mW8"),
                avatar_bucket: "avatar".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        // Never connects: every request below is rejected before any query
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/clubhouse")
            .unwrap();
        let state = AppState::new(config, pool).unwrap();

        routes()
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_signed_out_json_client_gets_401() {
        let response = app()
            .oneshot(
                Request::get("/account")
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_out_browser_is_sent_home() {
        let response = app()
            .oneshot(Request::post("/account/save").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_form_route_only_accepts_patch() {
        let response = app()
            .oneshot(Request::post("/account/form").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
