//! Fixed choices for the registration selects.
//!
//! Like the club directory, values are matched exactly. No case or
//! whitespace normalization is applied.

use super::profile::RequiredField;

pub const GENDER_OPTIONS: &[&str] = &["Male", "Female"];

pub const YEAR_OPTIONS: &[&str] = &["1", "2", "3", "4"];

pub const DEGREE_OPTIONS: &[&str] = &[
    "B.Tech.", "M.Tech.", "MCA", "MBA", "BBA", "BCA", "B.Pharm.", "D.Pharm.", "B.Sc.", "DHM",
    "B.A.", "Ph.D",
];

pub const BRANCH_OPTIONS: &[&str] = &[
    "CSE Core",
    "CSE AIML",
    "CSE DS",
    "CSE CS",
    "CSE CC",
    "CSE CSBS",
    "ECE",
    "ME",
    "AE",
    "CSE",
    "DS",
    "HCM",
    "HMCS",
    "CS",
    "Mathematics",
    "Chemistry",
    "Psychology",
    "English",
];

/// The allowed values for a select-backed field, or `None` for free text.
#[must_use]
pub const fn options_for(field: RequiredField) -> Option<&'static [&'static str]> {
    match field {
        RequiredField::Gender => Some(GENDER_OPTIONS),
        RequiredField::Year => Some(YEAR_OPTIONS),
        RequiredField::Degree => Some(DEGREE_OPTIONS),
        RequiredField::Branch => Some(BRANCH_OPTIONS),
        _ => None,
    }
}
