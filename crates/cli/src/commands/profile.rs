//! Profile inspection commands.
//!
//! # Usage
//!
//! ```bash
//! clubhouse-cli profile status <USER_ID>
//! ```

use sqlx::PgPool;
use thiserror::Error;

use clubhouse_core::{ProfileMode, RequiredField, UserId};
use clubhouse_portal::db::{ProfileRepository, RepositoryError};

/// Errors that can occur during profile inspection.
#[derive(Debug, Error)]
pub enum ProfileCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Print the render mode a user would land in and what their profile lacks.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the lookup fails.
pub async fn status(user_id: UserId) -> Result<(), ProfileCommandError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(ProfileCommandError::MissingEnvVar("PORTAL_DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    let profile = ProfileRepository::new(&pool).get_by_user(user_id).await?;
    let mode = ProfileMode::initial_for(profile.as_ref());
    let missing = profile
        .as_ref()
        .map_or_else(|| RequiredField::ALL.to_vec(), |p| p.missing_fields());

    #[allow(clippy::print_stdout)]
    {
        match &profile {
            Some(p) => println!("profile {} for user {user_id}", p.id),
            None => println!("no profile row for user {user_id}"),
        }
        println!("mode: {mode:?}");
        if missing.is_empty() {
            println!("complete");
        } else {
            let names: Vec<&str> = missing.iter().copied().map(RequiredField::as_str).collect();
            println!("missing: {}", names.join(", "));
        }
    }

    Ok(())
}
