//! Core types for Clubhouse.
//!
//! This module provides the profile record and the pieces of editable state
//! that surround it.

pub mod avatar;
pub mod club;
pub mod form;
pub mod id;
pub mod mode;
pub mod options;
pub mod profile;

pub use avatar::{AvatarRef, PendingImage};
pub use club::{CLUB_DIRECTORY, ClubSet, is_directory_club};
pub use form::{FormPatch, ProfileForm};
pub use id::*;
pub use mode::{ModeEvent, ProfileMode};
pub use options::{BRANCH_OPTIONS, DEGREE_OPTIONS, GENDER_OPTIONS, YEAR_OPTIONS, options_for};
pub use profile::{Identity, IdentityFields, Profile, ProfileUpdate, RequiredField, is_complete};
