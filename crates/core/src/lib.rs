//! Clubhouse Core - Profile types, rules and workflow state.
//!
//! This crate provides the pieces of the profile workflow that involve no I/O:
//! - the profile record and its completeness rule
//! - the editable form and club selection
//! - the render-mode state machine and the per-user workspace
//! - the traits implemented by the session, database, storage and
//!   notification collaborators
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no database access, no
//! HTTP clients. `clubhouse-portal` supplies the concrete collaborators and
//! drives the workflow.
//!
//! # Modules
//!
//! - [`types`] - Profile, form, club set, avatar reference and mode types
//! - [`error`] - Workflow error taxonomy
//! - [`ports`] - Collaborator traits
//! - [`workspace`] - Per-user workflow state with stale-result guard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod ports;
pub mod types;
pub mod workspace;

pub use error::{BoxError, ProfileError, ValidationError};
pub use types::*;
