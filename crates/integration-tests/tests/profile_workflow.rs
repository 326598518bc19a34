//! Integration tests for the profile workflow.
//!
//! These drive the portal's mount and save services against in-memory
//! collaborators, so no database or storage service is needed.

#![allow(clippy::unwrap_used)]

use clubhouse_core::workspace::{MountOutcome, SaveOutcome};
use clubhouse_core::{
    AvatarRef, FormPatch, ProfileError, ProfileMode, RequiredField, ValidationError,
};
use clubhouse_integration_tests::{
    CDN_BASE, Call, CallLog, MemoryBlobs, MemoryProfiles, MemorySessions, complete_profile, png,
    registration_form, student,
};
use clubhouse_portal::services::profile::{
    self, AvatarResolver, IdentityResolver, ProfileSession, SAVE_SUCCESS, SaveCoordinator,
};

struct Harness {
    log: CallLog,
    sessions: MemorySessions,
    profiles: MemoryProfiles,
    blobs: MemoryBlobs,
    session: ProfileSession,
}

impl Harness {
    fn new(sessions: MemorySessions, profiles: impl FnOnce(CallLog) -> MemoryProfiles) -> Self {
        let log = CallLog::default();
        Self {
            sessions,
            profiles: profiles(log.clone()),
            blobs: MemoryBlobs::new(log.clone()),
            log,
            session: ProfileSession::new(),
        }
    }

    async fn mount(&self) -> Result<MountOutcome, ProfileError> {
        let resolver = IdentityResolver::new(&self.sessions, &self.profiles);
        profile::mount(&self.session, &resolver).await
    }

    async fn save(&self) -> Result<SaveOutcome, ProfileError> {
        let coordinator = SaveCoordinator::new(&self.blobs, &self.profiles);
        profile::save(&self.session, &coordinator).await
    }

    fn messages(&self) -> Vec<String> {
        self.session
            .view(&AvatarResolver::new(&self.blobs))
            .notifications
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_first_registration_uploads_then_persists() {
    let user = student();
    let h = Harness::new(MemorySessions::signed_in(user.clone()), MemoryProfiles::new);

    assert_eq!(
        h.mount().await.unwrap(),
        MountOutcome::Applied(ProfileMode::Registering)
    );
    let profile_id = h.session.with(|ws| ws.profile_id());

    h.session.with(|ws| {
        ws.edit_form(registration_form()).unwrap();
        ws.toggle_club("ACM").unwrap();
        ws.stage_image(png()).unwrap();
    });

    assert_eq!(
        h.save().await.unwrap(),
        SaveOutcome::Saved(ProfileMode::Viewing)
    );

    let key = AvatarRef::key_for(profile_id);
    let calls = h.log.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], Call::Select(user.id));
    assert_eq!(calls[1], Call::Upload(key.clone()));
    let Call::Upsert(update) = &calls[2] else {
        panic!("expected upsert last, got {calls:?}");
    };
    assert_eq!(update.id, profile_id);
    assert_eq!(update.clubs, Some(vec!["ACM".to_string()]));
    assert_eq!(update.avatar, Some(AvatarRef::new(key.clone())));
    assert!(update.identity.is_some());

    let row = h.profiles.row(user.id).unwrap();
    assert!(row.is_complete());
    assert_eq!(h.blobs.object(&key), Some(png().bytes));

    let view = h.session.view(&AvatarResolver::new(&h.blobs));
    assert_eq!(view.mode, Some(ProfileMode::Viewing));
    assert_eq!(view.avatar_url, format!("{CDN_BASE}{key}"));
    assert!(view.pending_image.is_none());
    assert_eq!(view.notifications.len(), 1);
    assert_eq!(view.notifications[0].message, SAVE_SUCCESS);
}

#[tokio::test]
async fn test_missing_field_blocks_save_without_calls() {
    let h = Harness::new(MemorySessions::signed_in(student()), MemoryProfiles::new);
    h.mount().await.unwrap();
    h.log.clear();

    h.session.with(|ws| {
        ws.edit_form(FormPatch {
            phone: None,
            ..registration_form()
        })
        .unwrap();
        ws.stage_image(png()).unwrap();
    });
    let before = h.session.with(|ws| ws.form().clone());

    let err = h.save().await.unwrap_err();
    assert!(matches!(
        err,
        ProfileError::Validation(ValidationError::MissingFields(ref fields))
            if fields == &[RequiredField::Phone]
    ));

    assert!(h.log.calls().is_empty());
    assert_eq!(h.session.with(|ws| ws.form().clone()), before);
    assert_eq!(h.session.with(|ws| ws.mode()), Some(ProfileMode::Registering));
    assert_eq!(h.messages(), vec!["Please fill in all details".to_string()]);
}

#[tokio::test]
async fn test_registration_without_image_is_rejected() {
    let h = Harness::new(MemorySessions::signed_in(student()), MemoryProfiles::new);
    h.mount().await.unwrap();
    h.log.clear();
    h.session
        .with(|ws| ws.edit_form(registration_form()))
        .unwrap();

    let err = h.save().await.unwrap_err();
    assert!(matches!(
        err,
        ProfileError::Validation(ValidationError::MissingFields(ref fields))
            if fields == &[RequiredField::Avatar]
    ));
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn test_registration_without_clubs_stores_null_marker() {
    let user = student();
    let h = Harness::new(MemorySessions::signed_in(user.clone()), MemoryProfiles::new);
    h.mount().await.unwrap();

    h.session.with(|ws| {
        ws.edit_form(registration_form()).unwrap();
        // Selecting and deselecting leaves nothing behind
        ws.toggle_club("CSI").unwrap();
        ws.toggle_club("CSI").unwrap();
        ws.stage_image(png()).unwrap();
    });
    h.save().await.unwrap();

    let upserts = h.log.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].clubs, None);
    assert!(h.profiles.row(user.id).unwrap().clubs.is_empty());
}

#[tokio::test]
async fn test_upload_failure_skips_persist() {
    let h = Harness::new(MemorySessions::signed_in(student()), MemoryProfiles::new);
    h.mount().await.unwrap();
    h.session.with(|ws| {
        ws.edit_form(registration_form()).unwrap();
        ws.stage_image(png()).unwrap();
    });
    h.blobs.fail_uploads(true);

    let err = h.save().await.unwrap_err();
    assert!(matches!(err, ProfileError::Upload(_)));
    assert_eq!(h.log.uploads().len(), 1);
    assert!(h.log.upserts().is_empty());

    // The staged image survives for a retry
    assert!(h.session.with(|ws| ws.pending_image().is_some()));
    assert!(!h.session.with(|ws| ws.is_saving()));
    assert_eq!(h.messages(), vec!["Failed to upload avatar".to_string()]);
}

// ============================================================================
// Viewing and Editing
// ============================================================================

#[tokio::test]
async fn test_complete_profile_views_and_edits_without_calls() {
    let user = student();
    let row = complete_profile(user.id);
    let h = Harness::new(MemorySessions::signed_in(user), |log| {
        MemoryProfiles::new(log).with_row(row)
    });

    assert_eq!(
        h.mount().await.unwrap(),
        MountOutcome::Applied(ProfileMode::Viewing)
    );
    h.log.clear();

    assert_eq!(
        h.session.with(|ws| ws.begin_edit()).unwrap(),
        ProfileMode::Editing
    );
    assert!(h.log.calls().is_empty());

    let view = h.session.view(&AvatarResolver::new(&h.blobs));
    assert_eq!(view.mode, Some(ProfileMode::Editing));
    assert_eq!(view.clubs, vec!["ACM".to_string()]);
    assert_eq!(view.avatar_url, format!("{CDN_BASE}public/meera"));
}

#[tokio::test]
async fn test_edit_save_keeps_identity_and_avatar() {
    let user = student();
    let row = complete_profile(user.id);
    let h = Harness::new(MemorySessions::signed_in(user.clone()), |log| {
        MemoryProfiles::new(log).with_row(row)
    });
    h.mount().await.unwrap();
    h.session.with(|ws| ws.begin_edit()).unwrap();

    // Identity fields are frozen once registered
    let err = h
        .session
        .with(|ws| {
            ws.edit_form(FormPatch {
                phone: Some("9000000000".to_string()),
                ..FormPatch::default()
            })
        })
        .unwrap_err();
    assert!(matches!(err, ProfileError::ReadOnlyField(_)));

    h.session.with(|ws| {
        ws.toggle_club("ACM").unwrap();
        ws.toggle_club("GDSC").unwrap();
    });
    h.log.clear();

    assert_eq!(
        h.save().await.unwrap(),
        SaveOutcome::Saved(ProfileMode::Viewing)
    );

    assert!(h.log.uploads().is_empty());
    let upserts = h.log.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].clubs, Some(vec!["GDSC".to_string()]));
    assert!(upserts[0].identity.is_none());

    let stored = h.profiles.row(user.id).unwrap();
    assert_eq!(stored.phone.as_deref(), Some("9123456780"));
    assert_eq!(stored.avatar, Some(AvatarRef::new("public/meera")));
    assert!(stored.clubs.contains("GDSC"));
    assert!(!stored.clubs.contains("ACM"));
}

#[tokio::test]
async fn test_persist_failure_keeps_edits_for_retry() {
    let user = student();
    let row = complete_profile(user.id);
    let h = Harness::new(MemorySessions::signed_in(user.clone()), |log| {
        MemoryProfiles::new(log).with_row(row)
    });
    h.mount().await.unwrap();
    h.session.with(|ws| {
        ws.begin_edit().unwrap();
        ws.toggle_club("Genesis").unwrap();
        ws.stage_image(png()).unwrap();
    });
    h.profiles.fail_upserts(true);

    let err = h.save().await.unwrap_err();
    assert!(matches!(err, ProfileError::Persist(_)));
    assert_eq!(h.session.with(|ws| ws.mode()), Some(ProfileMode::Editing));
    assert!(h.session.with(|ws| ws.form().clubs.contains("Genesis")));
    assert!(h.session.with(|ws| ws.pending_image().is_some()));
    assert_eq!(h.messages(), vec!["Failed to save profile".to_string()]);

    h.profiles.fail_upserts(false);
    assert_eq!(
        h.save().await.unwrap(),
        SaveOutcome::Saved(ProfileMode::Viewing)
    );
    assert!(h.profiles.row(user.id).unwrap().clubs.contains("Genesis"));
}

#[tokio::test]
async fn test_unknown_club_is_rejected() {
    let h = Harness::new(MemorySessions::signed_in(student()), MemoryProfiles::new);
    h.mount().await.unwrap();

    let err = h.session.with(|ws| ws.toggle_club("Chess")).unwrap_err();
    assert!(matches!(err, ProfileError::UnknownClub(ref name) if name == "Chess"));
    assert!(h.session.with(|ws| ws.form().clubs.is_empty()));
}

// ============================================================================
// Identity
// ============================================================================

#[tokio::test]
async fn test_signed_out_mount_leaves_workspace_empty() {
    let h = Harness::new(MemorySessions::default(), MemoryProfiles::new);

    let err = h.mount().await.unwrap_err();
    assert!(matches!(err, ProfileError::SignedOut));
    assert_eq!(h.session.with(|ws| ws.mode()), None);
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn test_sign_out_then_remount_fails() {
    let user = student();
    let row = complete_profile(user.id);
    let h = Harness::new(MemorySessions::signed_in(user), |log| {
        MemoryProfiles::new(log).with_row(row)
    });
    h.mount().await.unwrap();

    h.sessions.sign_out();
    let err = h.mount().await.unwrap_err();
    assert!(matches!(err, ProfileError::SignedOut));
}
