//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use clubhouse_core::UserId;

use crate::config::PortalConfig;
use crate::db::ProfileRepository;
use crate::services::profile::{AvatarResolver, ProfileSession, SaveCoordinator};
use crate::storage::{StorageClient, StorageError};

/// Idle time after which a user's profile session is dropped.
const SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently cached profile sessions.
const MAX_SESSIONS: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    storage: StorageClient,
    sessions: Cache<UserId, Arc<ProfileSession>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage client cannot be built.
    pub fn new(config: PortalConfig, pool: PgPool) -> Result<Self, StorageError> {
        let storage = StorageClient::new(&config.storage)?;
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(SESSION_IDLE)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
                sessions,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the blob storage client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileRepository<'_> {
        ProfileRepository::new(&self.inner.pool)
    }

    #[must_use]
    pub fn avatars(&self) -> AvatarResolver<&StorageClient> {
        AvatarResolver::new(&self.inner.storage)
    }

    #[must_use]
    pub fn save_coordinator(&self) -> SaveCoordinator<&StorageClient, ProfileRepository<'_>> {
        SaveCoordinator::new(&self.inner.storage, self.profiles())
    }

    /// The profile session for `user_id`, created on first use.
    pub async fn profile_session(&self, user_id: UserId) -> Arc<ProfileSession> {
        self.inner
            .sessions
            .get_with(user_id, async { Arc::new(ProfileSession::new()) })
            .await
    }
}
