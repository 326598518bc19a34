//! Editable copy of a profile.
//!
//! The form is seeded once from a fetched row and then changes only through
//! its setters. It never talks to the network and is never merged with
//! server data field by field; a successful save replaces it wholesale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::club::ClubSet;
use super::options::options_for;
use super::profile::{IdentityFields, Profile, RequiredField};
use crate::error::ValidationError;

/// Date format accepted for the birth date field.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// All editable profile fields as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub given_name: String,
    pub family_name: String,
    pub middle_name: String,
    pub gender: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    pub phone: String,
    pub registration_no: String,
    pub email: String,
    pub year: String,
    pub degree: String,
    pub branch: String,
    pub clubs: ClubSet,
}

/// A partial form update. Only fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormPatch {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub registration_no: Option<String>,
    pub email: Option<String>,
    pub year: Option<String>,
    pub degree: Option<String>,
    pub branch: Option<String>,
}

impl FormPatch {
    /// Names of the fields this patch would change.
    #[must_use]
    pub fn touched(&self) -> Vec<&'static str> {
        [
            ("given_name", self.given_name.is_some()),
            ("family_name", self.family_name.is_some()),
            ("middle_name", self.middle_name.is_some()),
            ("gender", self.gender.is_some()),
            ("birth_date", self.birth_date.is_some()),
            ("phone", self.phone.is_some()),
            ("registration_no", self.registration_no.is_some()),
            ("email", self.email.is_some()),
            ("year", self.year.is_some()),
            ("degree", self.degree.is_some()),
            ("branch", self.branch.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

impl ProfileForm {
    /// Seed the form from a fetched row, or empty defaults when there is none.
    #[must_use]
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        let Some(p) = profile else {
            return Self::default();
        };

        Self {
            given_name: p.given_name.clone().unwrap_or_default(),
            family_name: p.family_name.clone().unwrap_or_default(),
            middle_name: p.middle_name.clone().unwrap_or_default(),
            gender: p.gender.clone().unwrap_or_default(),
            birth_date: p
                .birth_date
                .map(|d| d.format(BIRTH_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            phone: p.phone.clone().unwrap_or_default(),
            registration_no: p.registration_no.clone().unwrap_or_default(),
            email: p.email.clone().unwrap_or_default(),
            year: p
                .year
                .filter(|year| *year != 0)
                .map(|year| year.to_string())
                .unwrap_or_default(),
            degree: p.degree.clone().unwrap_or_default(),
            branch: p.branch.clone().unwrap_or_default(),
            clubs: p.clubs.clone(),
        }
    }

    pub fn set_given_name(&mut self, value: impl Into<String>) {
        self.given_name = value.into();
    }

    pub fn set_family_name(&mut self, value: impl Into<String>) {
        self.family_name = value.into();
    }

    pub fn set_middle_name(&mut self, value: impl Into<String>) {
        self.middle_name = value.into();
    }

    pub fn set_gender(&mut self, value: impl Into<String>) {
        self.gender = value.into();
    }

    pub fn set_birth_date(&mut self, value: impl Into<String>) {
        self.birth_date = value.into();
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.phone = value.into();
    }

    pub fn set_registration_no(&mut self, value: impl Into<String>) {
        self.registration_no = value.into();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn set_year(&mut self, value: impl Into<String>) {
        self.year = value.into();
    }

    pub fn set_degree(&mut self, value: impl Into<String>) {
        self.degree = value.into();
    }

    pub fn set_branch(&mut self, value: impl Into<String>) {
        self.branch = value.into();
    }

    /// Toggle a club in the selection and return the new set.
    pub fn toggle_club(&mut self, name: &str) -> &ClubSet {
        self.clubs.toggle(name)
    }

    /// Apply every field present in `patch`, leaving the rest unchanged.
    pub fn apply(&mut self, patch: FormPatch) {
        let FormPatch {
            given_name,
            family_name,
            middle_name,
            gender,
            birth_date,
            phone,
            registration_no,
            email,
            year,
            degree,
            branch,
        } = patch;

        if let Some(v) = given_name {
            self.set_given_name(v);
        }
        if let Some(v) = family_name {
            self.set_family_name(v);
        }
        if let Some(v) = middle_name {
            self.set_middle_name(v);
        }
        if let Some(v) = gender {
            self.set_gender(v);
        }
        if let Some(v) = birth_date {
            self.set_birth_date(v);
        }
        if let Some(v) = phone {
            self.set_phone(v);
        }
        if let Some(v) = registration_no {
            self.set_registration_no(v);
        }
        if let Some(v) = email {
            self.set_email(v);
        }
        if let Some(v) = year {
            self.set_year(v);
        }
        if let Some(v) = degree {
            self.set_degree(v);
        }
        if let Some(v) = branch {
            self.set_branch(v);
        }
    }

    /// Required fields (other than the avatar) that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| match field {
                RequiredField::GivenName => self.given_name.is_empty(),
                RequiredField::FamilyName => self.family_name.is_empty(),
                RequiredField::Gender => self.gender.is_empty(),
                RequiredField::BirthDate => self.birth_date.is_empty(),
                RequiredField::Phone => self.phone.is_empty(),
                RequiredField::RegistrationNo => self.registration_no.is_empty(),
                RequiredField::Year => self.year.is_empty(),
                RequiredField::Degree => self.degree.is_empty(),
                RequiredField::Branch => self.branch.is_empty(),
                RequiredField::Email => self.email.is_empty(),
                // Checked against the pending image and stored row instead.
                RequiredField::Avatar => false,
            })
            .collect()
    }

    /// Check every required scalar and parse the typed ones.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` if any required field is
    /// empty, or `ValidationError::InvalidField` if the birth date or year
    /// cannot be parsed.
    pub fn validate(&self) -> Result<IdentityFields, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let birth_date = NaiveDate::parse_from_str(&self.birth_date, BIRTH_DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidField {
                field: RequiredField::BirthDate,
                reason: format!("expected YYYY-MM-DD, got {:?}", self.birth_date),
            })?;

        let year = self
            .year
            .parse::<i32>()
            .ok()
            .filter(|year| *year > 0)
            .ok_or_else(|| ValidationError::InvalidField {
                field: RequiredField::Year,
                reason: format!("expected a positive number, got {:?}", self.year),
            })?;

        Ok(IdentityFields {
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            middle_name: Some(self.middle_name.clone()).filter(|m| !m.is_empty()),
            gender: self.gender.clone(),
            birth_date,
            phone: self.phone.clone(),
            registration_no: self.registration_no.clone(),
            email: self.email.clone(),
            year,
            degree: self.degree.clone(),
            branch: self.branch.clone(),
        })
    }

    /// [`validate`](Self::validate), and each select field must hold one of
    /// its listed options.
    ///
    /// # Errors
    ///
    /// As for `validate`, plus `ValidationError::InvalidField` for a gender,
    /// year, degree or branch outside its option list.
    pub fn validate_registration(&self) -> Result<IdentityFields, ValidationError> {
        let fields = self.validate()?;

        for (field, value) in [
            (RequiredField::Gender, &self.gender),
            (RequiredField::Year, &self.year),
            (RequiredField::Degree, &self.degree),
            (RequiredField::Branch, &self.branch),
        ] {
            if let Some(options) = options_for(field)
                && !options.contains(&value.as_str())
            {
                return Err(ValidationError::InvalidField {
                    field,
                    reason: format!("{value:?} is not one of {}", options.join(", ")),
                });
            }
        }

        Ok(fields)
    }
}
