//! End-to-end catalog lifecycle tests
//!
//! Exercises the startup sequence (sweep, then load) and the
//! match-or-enroll flow across simulated restarts.

use chrono::{Duration, Utc};
use std::path::Path;
use tempfile::TempDir;
use voicegate_id::{IdConfig, IdentityRecord, Session};

fn test_config(dir: &TempDir) -> IdConfig {
    IdConfig {
        catalog_folder: dir.path().to_path_buf(),
        expiry_days: 7,
        similarity_threshold: 0.35,
    }
}

/// Plant a profile file with a backdated last_seen
fn write_aged_profile(folder: &Path, id: &str, embedding: &[f32], days_old: i64) {
    let record = IdentityRecord {
        id: id.to_string(),
        embedding: embedding.to_vec(),
        last_seen: Utc::now() - Duration::days(days_old),
    };
    std::fs::write(
        folder.join(format!("{}.json", id)),
        serde_json::to_vec(&record).unwrap(),
    )
    .unwrap();
}

#[test]
fn enrollments_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    {
        let mut session = Session::open(&config).unwrap();
        assert_eq!(session.catalog().len(), 0);

        let first = session.identify(&[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(first.id, "User_1");
        assert!(first.is_new);
        assert_eq!(first.score, -1.0);

        let second = session.identify(&[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(second.id, "User_2");
        assert!(second.is_new);
    }

    // Restart: both identities load and still match
    let mut session = Session::open(&config).unwrap();
    assert_eq!(session.catalog().len(), 2);
    assert_eq!(session.evicted_at_start(), 0);

    let outcome = session.identify(&[0.98, 0.05, 0.0]).unwrap();
    assert_eq!(outcome.id, "User_1");
    assert!(!outcome.is_new);
    assert!(outcome.score > 0.9);
}

#[test]
fn expired_profiles_are_swept_before_matching() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    // One stale identity at the inclusive boundary, one fresh
    write_aged_profile(dir.path(), "User_1", &[1.0, 0.0], 7);
    write_aged_profile(dir.path(), "User_5", &[0.0, 1.0], 1);

    let mut session = Session::open(&config).unwrap();
    assert_eq!(session.evicted_at_start(), 1);
    assert_eq!(session.catalog().len(), 1);

    // The evicted identity's embedding must not match anymore; a new
    // profile is enrolled instead. Ids derive from catalog size, so the
    // ordinal freed by eviction is reused rather than continued.
    let outcome = session.identify(&[1.0, 0.0]).unwrap();
    assert!(outcome.is_new);
    assert_eq!(outcome.id, "User_2");
}

#[test]
fn corrupt_profiles_are_skipped_but_kept() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    write_aged_profile(dir.path(), "User_1", &[1.0, 0.0], 1);
    let corrupt_path = dir.path().join("User_2.json");
    std::fs::write(&corrupt_path, b"\x00\x01 not a profile").unwrap();

    let session = Session::open(&config).unwrap();
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.evicted_at_start(), 0);
    assert!(corrupt_path.exists(), "sweep must not delete corrupt units");
}

#[test]
fn match_extends_lifetime_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    // Six days unseen: one day away from eviction
    write_aged_profile(dir.path(), "User_1", &[1.0, 0.0], 6);

    {
        let mut session = Session::open(&config).unwrap();
        let outcome = session.identify(&[1.0, 0.05]).unwrap();
        assert_eq!(outcome.id, "User_1");
        assert!(!outcome.is_new);
    }

    // The refreshed last_seen keeps the profile through another sweep,
    // and the enrollment embedding is still the one on file
    let session = Session::open(&config).unwrap();
    assert_eq!(session.evicted_at_start(), 0);
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.catalog().entries()[0].record.embedding, vec![1.0, 0.0]);
}
