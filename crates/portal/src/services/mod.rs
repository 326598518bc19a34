//! Portal services.

pub mod profile;
