//! Integration tests for Clubhouse.
//!
//! # Running Tests
//!
//! ```bash
//! # Workflow tests (in-memory collaborators, no services needed)
//! cargo test -p clubhouse-integration-tests
//!
//! # Include tests against a running portal
//! cargo test -p clubhouse-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `profile_workflow` - Registration, viewing, editing and save failures
//! - `profile_concurrency` - Stale mounts and overlapping saves
//! - `portal_http` - HTTP surface of a running portal
//!
//! This library holds the in-memory collaborators the workflow tests share.
//! Every call they receive is appended to a [`CallLog`] so tests can assert
//! on ordering and on the absence of calls.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use clubhouse_core::ports::{BlobStore, ProfileStore, SessionProvider};
use clubhouse_core::{
    AvatarRef, ClubSet, FormPatch, Identity, PendingImage, Profile, ProfileId, ProfileUpdate,
    UserId,
};

/// Public base URL the in-memory blob store hands out.
pub const CDN_BASE: &str = "https://cdn.example.edu/avatars/";

/// Failure injected into an in-memory collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InjectedError(pub &'static str);

/// One collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select(UserId),
    Upload(String),
    Upsert(ProfileUpdate),
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    #[must_use]
    pub fn upserts(&self) -> Vec<ProfileUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upsert(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Holds calls until the test releases them.
#[derive(Debug, Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    #[must_use]
    pub fn closed() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    /// Let one held call through.
    pub fn release(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        self.0.acquire().await.unwrap().forget();
    }
}

/// Session holding whoever is signed in.
#[derive(Debug, Default)]
pub struct MemorySessions {
    current: Mutex<Option<Identity>>,
}

impl MemorySessions {
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: Mutex::new(Some(identity)),
        }
    }

    pub fn sign_out(&self) {
        *self.current.lock().unwrap() = None;
    }
}

impl SessionProvider for MemorySessions {
    type Error = InjectedError;

    async fn current_user(&self) -> Result<Option<Identity>, Self::Error> {
        Ok(self.current.lock().unwrap().clone())
    }
}

/// Profile table keyed by owner.
#[derive(Debug, Default)]
pub struct MemoryProfiles {
    rows: Mutex<HashMap<UserId, Profile>>,
    log: CallLog,
    fail_upsert: AtomicBool,
    select_gate: Option<Gate>,
    upsert_gate: Option<Gate>,
}

impl MemoryProfiles {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_row(self, profile: Profile) -> Self {
        self.rows.lock().unwrap().insert(profile.user_id, profile);
        self
    }

    /// Hold every select until `gate` is released.
    #[must_use]
    pub fn hold_selects(mut self, gate: Gate) -> Self {
        self.select_gate = Some(gate);
        self
    }

    /// Hold every upsert until `gate` is released.
    #[must_use]
    pub fn hold_upserts(mut self, gate: Gate) -> Self {
        self.upsert_gate = Some(gate);
        self
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn row(&self, user_id: UserId) -> Option<Profile> {
        self.rows.lock().unwrap().get(&user_id).cloned()
    }
}

impl ProfileStore for MemoryProfiles {
    type Error = InjectedError;

    async fn select_by_identity(&self, user_id: UserId) -> Result<Option<Profile>, Self::Error> {
        self.log.push(Call::Select(user_id));
        if let Some(gate) = &self.select_gate {
            gate.pass().await;
        }
        Ok(self.row(user_id))
    }

    async fn upsert(&self, update: &ProfileUpdate) -> Result<Profile, Self::Error> {
        self.log.push(Call::Upsert(update.clone()));
        if let Some(gate) = &self.upsert_gate {
            gate.pass().await;
        }
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(InjectedError("connection reset by peer"));
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(update.user_id)
            .or_insert_with(|| Profile::empty(update.id, update.user_id));
        row.clubs = ClubSet::from_stored(update.clubs.clone());
        if let Some(avatar) = &update.avatar {
            row.avatar = Some(avatar.clone());
        }
        if let Some(i) = &update.identity {
            row.given_name = Some(i.given_name.clone());
            row.family_name = Some(i.family_name.clone());
            row.middle_name.clone_from(&i.middle_name);
            row.gender = Some(i.gender.clone());
            row.birth_date = Some(i.birth_date);
            row.phone = Some(i.phone.clone());
            row.registration_no = Some(i.registration_no.clone());
            row.email = Some(i.email.clone());
            row.year = Some(i.year);
            row.degree = Some(i.degree.clone());
            row.branch = Some(i.branch.clone());
        }
        Ok(row.clone())
    }
}

/// Object store that keeps uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobs {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    log: CallLog,
    fail_upload: AtomicBool,
}

impl MemoryBlobs {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

impl BlobStore for MemoryBlobs {
    type Error = InjectedError;

    async fn upload(&self, key: &str, image: &PendingImage) -> Result<AvatarRef, Self::Error> {
        self.log.push(Call::Upload(key.to_owned()));
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(InjectedError("bucket unavailable"));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_owned(), image.bytes.clone());
        Ok(AvatarRef::new(key))
    }

    fn public_url(&self, reference: &AvatarRef) -> Result<Url, Self::Error> {
        Url::parse(CDN_BASE)
            .and_then(|base| base.join(reference.as_str()))
            .map_err(|_| InjectedError("unresolvable reference"))
    }
}

/// A signed-in student.
#[must_use]
pub fn student() -> Identity {
    Identity {
        id: UserId::generate(),
        email: Some("meera@example.edu".to_string()),
    }
}

/// A fully filled row owned by `owner`, in the ACM club.
#[must_use]
pub fn complete_profile(owner: UserId) -> Profile {
    Profile {
        given_name: Some("Meera".to_string()),
        family_name: Some("Iyer".to_string()),
        gender: Some("Female".to_string()),
        birth_date: NaiveDate::from_ymd_opt(2004, 1, 23),
        phone: Some("9123456780".to_string()),
        registration_no: Some("22BEC0917".to_string()),
        email: Some("meera@example.edu".to_string()),
        year: Some(2),
        degree: Some("B.Tech.".to_string()),
        branch: Some("ECE".to_string()),
        clubs: ClubSet::from_iter(["ACM"]),
        avatar: Some(AvatarRef::new("public/meera")),
        created_at: Utc::now(),
        ..Profile::empty(ProfileId::generate(), owner)
    }
}

/// Every required identity field, filled.
#[must_use]
pub fn registration_form() -> FormPatch {
    FormPatch {
        given_name: Some("Meera".to_string()),
        family_name: Some("Iyer".to_string()),
        middle_name: None,
        gender: Some("Female".to_string()),
        birth_date: Some("2004-01-23".to_string()),
        phone: Some("9123456780".to_string()),
        registration_no: Some("22BEC0917".to_string()),
        email: Some("meera@example.edu".to_string()),
        year: Some("2".to_string()),
        degree: Some("B.Tech.".to_string()),
        branch: Some("ECE".to_string()),
    }
}

/// A small PNG-typed image.
#[must_use]
pub fn png() -> PendingImage {
    PendingImage {
        content_type: "image/png".to_string(),
        file_name: Some("me.png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}
