//! Profile records and the completeness rule.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::avatar::AvatarRef;
use super::club::ClubSet;
use super::id::{ProfileId, UserId};

/// The signed-in identity reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity issued by the session provider.
    pub id: UserId,
    /// Email the identity signed in with, if the provider exposes it.
    pub email: Option<String>,
}

/// One person's profile row.
///
/// Scalar fields are optional because rows are provisioned externally and
/// may be partially filled. An empty string counts as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable row key, also used as the avatar storage key.
    pub id: ProfileId,
    /// Owning session identity.
    pub user_id: UserId,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub registration_no: Option<String>,
    pub email: Option<String>,
    /// Year of study; `0` counts as missing.
    pub year: Option<i32>,
    pub degree: Option<String>,
    pub branch: Option<String>,
    pub clubs: ClubSet,
    pub avatar: Option<AvatarRef>,
    pub created_at: DateTime<Utc>,
}

/// Fields that must be present for a profile to count as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    GivenName,
    FamilyName,
    Gender,
    BirthDate,
    Phone,
    RegistrationNo,
    Year,
    Degree,
    Branch,
    Avatar,
    Email,
}

impl RequiredField {
    /// Every required field, in form order.
    pub const ALL: [Self; 11] = [
        Self::GivenName,
        Self::FamilyName,
        Self::Gender,
        Self::BirthDate,
        Self::Phone,
        Self::RegistrationNo,
        Self::Year,
        Self::Degree,
        Self::Branch,
        Self::Avatar,
        Self::Email,
    ];

    /// Field name as used in JSON payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GivenName => "given_name",
            Self::FamilyName => "family_name",
            Self::Gender => "gender",
            Self::BirthDate => "birth_date",
            Self::Phone => "phone",
            Self::RegistrationNo => "registration_no",
            Self::Year => "year",
            Self::Degree => "degree",
            Self::Branch => "branch",
            Self::Avatar => "avatar",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

impl Profile {
    /// An empty row for `user_id` under `id`; every required field is missing.
    #[must_use]
    pub fn empty(id: ProfileId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            given_name: None,
            family_name: None,
            middle_name: None,
            gender: None,
            birth_date: None,
            phone: None,
            registration_no: None,
            email: None,
            year: None,
            degree: None,
            branch: None,
            clubs: ClubSet::new(),
            avatar: None,
            created_at: Utc::now(),
        }
    }

    /// Whether a single required field is present.
    #[must_use]
    pub fn has(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::GivenName => !is_blank(self.given_name.as_deref()),
            RequiredField::FamilyName => !is_blank(self.family_name.as_deref()),
            RequiredField::Gender => !is_blank(self.gender.as_deref()),
            RequiredField::BirthDate => self.birth_date.is_some(),
            RequiredField::Phone => !is_blank(self.phone.as_deref()),
            RequiredField::RegistrationNo => !is_blank(self.registration_no.as_deref()),
            RequiredField::Year => self.year.is_some_and(|year| year > 0),
            RequiredField::Degree => !is_blank(self.degree.as_deref()),
            RequiredField::Branch => !is_blank(self.branch.as_deref()),
            RequiredField::Avatar => self
                .avatar
                .as_ref()
                .is_some_and(|avatar| !avatar.as_str().is_empty()),
            RequiredField::Email => !is_blank(self.email.as_deref()),
        }
    }

    /// Required fields that are missing, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .collect()
    }

    /// True once every required field, including the avatar, is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        RequiredField::ALL.into_iter().all(|field| self.has(field))
    }
}

/// Completeness of a possibly-absent row. No row is never complete.
#[must_use]
pub fn is_complete(profile: Option<&Profile>) -> bool {
    profile.is_some_and(Profile::is_complete)
}

/// Identity scalars written by a registration save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFields {
    pub given_name: String,
    pub family_name: String,
    pub middle_name: Option<String>,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub registration_no: String,
    pub email: String,
    pub year: i32,
    pub degree: String,
    pub branch: String,
}

/// Partial row written by a save, keyed by `id`.
///
/// Fields that are not part of the update keep their stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub id: ProfileId,
    pub user_id: UserId,
    /// `None` is the explicit "no clubs" marker.
    pub clubs: Option<Vec<String>>,
    pub avatar: Option<AvatarRef>,
    /// Present only for the first (registration) save; identity fields are
    /// not editable once a profile is complete.
    pub identity: Option<IdentityFields>,
}

impl ProfileUpdate {
    /// Build an update from the selected clubs and resolved avatar.
    #[must_use]
    pub fn new(
        id: ProfileId,
        user_id: UserId,
        clubs: &ClubSet,
        avatar: Option<AvatarRef>,
        identity: Option<IdentityFields>,
    ) -> Self {
        Self {
            id,
            user_id,
            clubs: clubs.to_stored(),
            avatar,
            identity,
        }
    }
}
