//! Integration tests for overlapping workflow steps.
//!
//! Collaborator calls are held behind a [`Gate`] so that a second step can
//! run while the first is suspended.

#![allow(clippy::unwrap_used)]

use clubhouse_core::workspace::{MountOutcome, SaveOutcome};
use clubhouse_core::{ProfileError, ProfileMode};
use clubhouse_integration_tests::{
    CallLog, Gate, MemoryBlobs, MemoryProfiles, MemorySessions, complete_profile, png,
    registration_form, student,
};
use clubhouse_portal::services::profile::{
    self, IdentityResolver, ProfileSession, SaveCoordinator,
};

#[tokio::test]
async fn test_stale_mount_is_ignored() {
    let user = student();
    let sessions = MemorySessions::signed_in(user.clone());
    let gate = Gate::closed();

    // The slow mount would see an empty row, the fast one a complete row
    let slow_store = MemoryProfiles::new(CallLog::default()).hold_selects(gate.clone());
    let fast_store = MemoryProfiles::new(CallLog::default()).with_row(complete_profile(user.id));

    let session = ProfileSession::new();
    let slow_resolver = IdentityResolver::new(&sessions, &slow_store);
    let fast_resolver = IdentityResolver::new(&sessions, &fast_store);

    let slow = profile::mount(&session, &slow_resolver);
    let fast = async {
        let outcome = profile::mount(&session, &fast_resolver).await;
        gate.release();
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(fast.unwrap(), MountOutcome::Applied(ProfileMode::Viewing));
    assert_eq!(slow.unwrap(), MountOutcome::Stale);
    assert_eq!(session.with(|ws| ws.mode()), Some(ProfileMode::Viewing));
    assert!(!session.with(|ws| ws.is_loading()));
}

#[tokio::test]
async fn test_incomplete_remount_does_not_regress_view() {
    let user = student();
    let sessions = MemorySessions::signed_in(user.clone());
    let complete = MemoryProfiles::new(CallLog::default()).with_row(complete_profile(user.id));
    let empty = MemoryProfiles::new(CallLog::default());
    let session = ProfileSession::new();

    profile::mount(&session, &IdentityResolver::new(&sessions, &complete))
        .await
        .unwrap();
    let outcome = profile::mount(&session, &IdentityResolver::new(&sessions, &empty))
        .await
        .unwrap();

    assert_eq!(outcome, MountOutcome::Retained(ProfileMode::Viewing));
    assert!(session.with(|ws| ws.profile().is_some_and(|p| p.is_complete())));
}

#[tokio::test]
async fn test_overlapping_save_is_rejected() {
    let log = CallLog::default();
    let gate = Gate::closed();
    let sessions = MemorySessions::signed_in(student());
    let profiles = MemoryProfiles::new(log.clone()).hold_upserts(gate.clone());
    let blobs = MemoryBlobs::new(log.clone());
    let session = ProfileSession::new();

    profile::mount(&session, &IdentityResolver::new(&sessions, &profiles))
        .await
        .unwrap();
    session.with(|ws| {
        ws.edit_form(registration_form()).unwrap();
        ws.stage_image(png()).unwrap();
    });

    let coordinator = SaveCoordinator::new(&blobs, &profiles);
    let first = profile::save(&session, &coordinator);
    let second = async {
        let outcome = profile::save(&session, &coordinator).await;
        gate.release();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(second, Err(ProfileError::SaveInProgress)));
    assert_eq!(first.unwrap(), SaveOutcome::Saved(ProfileMode::Viewing));
    assert_eq!(log.uploads().len(), 1);
    assert_eq!(log.upserts().len(), 1);
    assert!(!session.with(|ws| ws.is_saving()));
}

#[tokio::test]
async fn test_mount_started_before_save_cannot_undo_it() {
    let user = student();
    let gate = Gate::closed();
    let sessions = MemorySessions::signed_in(user.clone());
    let profiles = MemoryProfiles::new(CallLog::default()).with_row(complete_profile(user.id));
    // Still serves the row as it was before the save
    let lagging = MemoryProfiles::new(CallLog::default())
        .with_row(complete_profile(user.id))
        .hold_selects(gate.clone());
    let blobs = MemoryBlobs::new(CallLog::default());
    let session = ProfileSession::new();

    profile::mount(&session, &IdentityResolver::new(&sessions, &profiles))
        .await
        .unwrap();
    session.with(|ws| {
        ws.begin_edit().unwrap();
        ws.toggle_club("ACM").unwrap();
        ws.toggle_club("GFG").unwrap();
    });

    let coordinator = SaveCoordinator::new(&blobs, &profiles);
    let lagging_resolver = IdentityResolver::new(&sessions, &lagging);
    let refetch = profile::mount(&session, &lagging_resolver);
    let save = async {
        let outcome = profile::save(&session, &coordinator).await;
        gate.release();
        outcome
    };
    let (refetch, save) = tokio::join!(refetch, save);

    assert_eq!(save.unwrap(), SaveOutcome::Saved(ProfileMode::Viewing));
    assert_eq!(refetch.unwrap(), MountOutcome::Stale);
    assert_eq!(session.with(|ws| ws.form().clubs.to_vec()), vec!["GFG".to_string()]);
    assert_eq!(
        profiles.row(user.id).unwrap().clubs.to_vec(),
        vec!["GFG".to_string()]
    );
    assert!(!session.with(|ws| ws.is_loading()));
}

#[tokio::test]
async fn test_leaving_during_save_discards_result() {
    let user = student();
    let gate = Gate::closed();
    let sessions = MemorySessions::signed_in(user.clone());
    let profiles = MemoryProfiles::new(CallLog::default())
        .with_row(complete_profile(user.id))
        .hold_upserts(gate.clone());
    let blobs = MemoryBlobs::new(CallLog::default());
    let session = ProfileSession::new();

    profile::mount(&session, &IdentityResolver::new(&sessions, &profiles))
        .await
        .unwrap();
    session.with(|ws| {
        ws.begin_edit().unwrap();
        ws.toggle_club("Magan").unwrap();
    });

    let coordinator = SaveCoordinator::new(&blobs, &profiles);
    let save = profile::save(&session, &coordinator);
    let leave = async {
        session.with(|ws| ws.unmount());
        gate.release();
    };
    let (outcome, ()) = tokio::join!(save, leave);

    assert_eq!(outcome.unwrap(), SaveOutcome::Discarded);
    assert_eq!(session.with(|ws| ws.mode()), None);
    assert!(!session.with(|ws| ws.is_saving()));
}
