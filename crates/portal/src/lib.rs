//! Clubhouse Portal library.
//!
//! Serves the student profile workflow over HTTP: session identity, the
//! profile table, avatar storage and the per-user workspace that ties them
//! together. Built as a library so the integration tests can drive it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
