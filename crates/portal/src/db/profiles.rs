//! Profile repository.
//!
//! Rows are provisioned externally and may be partially filled, so every
//! scalar column is nullable.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clubhouse_core::ports::ProfileStore;
use clubhouse_core::{AvatarRef, ClubSet, Profile, ProfileId, ProfileUpdate, UserId};

use super::RepositoryError;

/// Raw `portal.profile` row.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: ProfileId,
    user_id: UserId,
    given_name: Option<String>,
    family_name: Option<String>,
    middle_name: Option<String>,
    gender: Option<String>,
    birth_date: Option<NaiveDate>,
    phone: Option<String>,
    registration_no: Option<String>,
    email: Option<String>,
    year: Option<i32>,
    degree: Option<String>,
    branch: Option<String>,
    clubs: Option<Vec<String>>,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            given_name: row.given_name,
            family_name: row.family_name,
            middle_name: row.middle_name,
            gender: row.gender,
            birth_date: row.birth_date,
            phone: row.phone,
            registration_no: row.registration_no,
            email: row.email,
            year: row.year,
            degree: row.degree,
            branch: row.branch,
            clubs: ClubSet::from_stored(row.clubs),
            avatar: row.avatar.map(AvatarRef::new),
            created_at: row.created_at,
        }
    }
}

/// Repository for profile database operations.
#[derive(Clone, Copy)]
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile owned by a session identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, user_id, given_name, family_name, middle_name, gender, birth_date,
                   phone, registration_no, email, year, degree, branch, clubs, avatar,
                   created_at
            FROM portal.profile
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Insert or update a profile keyed by its id and return the stored row.
    ///
    /// Identity columns are written only when the update carries them;
    /// otherwise the stored values are kept. An absent avatar keeps the
    /// stored reference. `clubs` is always written, with NULL for no clubs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another row already belongs to
    /// the same identity, or `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, update), fields(profile_id = %update.id, identity = update.identity.is_some()))]
    pub async fn save(&self, update: &ProfileUpdate) -> Result<Profile, RepositoryError> {
        let identity = update.identity.as_ref();

        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO portal.profile AS p (
                id, user_id, clubs, avatar,
                given_name, family_name, middle_name, gender, birth_date,
                phone, registration_no, email, year, degree, branch
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                clubs = EXCLUDED.clubs,
                avatar = COALESCE(EXCLUDED.avatar, p.avatar),
                given_name = CASE WHEN $16 THEN EXCLUDED.given_name ELSE p.given_name END,
                family_name = CASE WHEN $16 THEN EXCLUDED.family_name ELSE p.family_name END,
                middle_name = CASE WHEN $16 THEN EXCLUDED.middle_name ELSE p.middle_name END,
                gender = CASE WHEN $16 THEN EXCLUDED.gender ELSE p.gender END,
                birth_date = CASE WHEN $16 THEN EXCLUDED.birth_date ELSE p.birth_date END,
                phone = CASE WHEN $16 THEN EXCLUDED.phone ELSE p.phone END,
                registration_no = CASE WHEN $16 THEN EXCLUDED.registration_no ELSE p.registration_no END,
                email = CASE WHEN $16 THEN EXCLUDED.email ELSE p.email END,
                year = CASE WHEN $16 THEN EXCLUDED.year ELSE p.year END,
                degree = CASE WHEN $16 THEN EXCLUDED.degree ELSE p.degree END,
                branch = CASE WHEN $16 THEN EXCLUDED.branch ELSE p.branch END
            RETURNING id, user_id, given_name, family_name, middle_name, gender, birth_date,
                      phone, registration_no, email, year, degree, branch, clubs, avatar,
                      created_at
            ",
        )
        .bind(update.id)
        .bind(update.user_id)
        .bind(update.clubs.as_deref())
        .bind(update.avatar.as_ref().map(AvatarRef::as_str))
        .bind(identity.map(|i| i.given_name.as_str()))
        .bind(identity.map(|i| i.family_name.as_str()))
        .bind(identity.and_then(|i| i.middle_name.as_deref()))
        .bind(identity.map(|i| i.gender.as_str()))
        .bind(identity.map(|i| i.birth_date))
        .bind(identity.map(|i| i.phone.as_str()))
        .bind(identity.map(|i| i.registration_no.as_str()))
        .bind(identity.map(|i| i.email.as_str()))
        .bind(identity.map(|i| i.year))
        .bind(identity.map(|i| i.degree.as_str()))
        .bind(identity.map(|i| i.branch.as_str()))
        .bind(identity.is_some())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "a profile already exists for user {}",
                    update.user_id
                ));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}

impl ProfileStore for ProfileRepository<'_> {
    type Error = RepositoryError;

    async fn select_by_identity(&self, user_id: UserId) -> Result<Option<Profile>, Self::Error> {
        self.get_by_user(user_id).await
    }

    async fn upsert(&self, update: &ProfileUpdate) -> Result<Profile, Self::Error> {
        self.save(update).await
    }
}
