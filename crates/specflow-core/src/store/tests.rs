use std::fs;

use tempfile::TempDir;

use super::{atomic, Layout, SpecStore};
use crate::{
    error::OrchestratorError,
    models::{Phase, Spec, Task},
};

fn create_test_store() -> (SpecStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SpecStore::open(Layout::new(dir.path())).expect("Failed to open store");
    (store, dir)
}

fn spec(id: &str, name: &str) -> Spec {
    Spec::new(
        id,
        name,
        format!("spec/{id}-{name}"),
        format!("/repo/worktrees/spec-{id}-{name}"),
    )
}

#[test]
fn test_insert_and_load() {
    let (store, _dir) = create_test_store();
    let record = spec("0a1b2c3d", "login");
    store.insert(&record).unwrap();

    let loaded = store.load("0a1b2c3d").unwrap();
    assert_eq!(loaded, record);

    let active = store.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "login");
    assert_eq!(active[0].phase, Phase::New);
}

#[test]
fn test_duplicate_name_rejected() {
    let (store, _dir) = create_test_store();
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
    let err = store.insert(&spec("11111111", "login")).unwrap_err();
    assert!(matches!(err, OrchestratorError::DuplicateName { .. }));
    assert_eq!(store.list_active().unwrap().len(), 1);
}

#[test]
fn test_failed_index_write_removes_new_record() {
    let (store, _dir) = create_test_store();
    store
        .fail_index_writes
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let err = store.insert(&spec("0a1b2c3d", "login")).unwrap_err();
    assert!(matches!(err, OrchestratorError::FileSystem { .. }));
    assert!(!store.spec_dir("0a1b2c3d").exists());

    store
        .fail_index_writes
        .store(false, std::sync::atomic::Ordering::SeqCst);
    assert!(store.list_active().unwrap().is_empty());
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
}

#[test]
fn test_failed_index_write_on_save_is_repairable() {
    let (store, _dir) = create_test_store();
    let mut record = spec("0a1b2c3d", "login");
    store.insert(&record).unwrap();

    store
        .fail_index_writes
        .store(true, std::sync::atomic::Ordering::SeqCst);
    record.phase = Phase::Defined;
    assert!(store.save(&mut record).is_err());
    store
        .fail_index_writes
        .store(false, std::sync::atomic::Ordering::SeqCst);

    assert_eq!(store.load("0a1b2c3d").unwrap().phase, Phase::Defined);
    assert_eq!(store.list_active().unwrap()[0].phase, Phase::New);
    let rebuilt = store.rebuild_index().unwrap();
    assert_eq!(rebuilt[0].phase, Phase::Defined);
}

#[test]
fn test_load_missing_is_not_found() {
    let (store, _dir) = create_test_store();
    let err = store.load("deadbeef").unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound { .. }));
}

#[test]
fn test_save_updates_record_and_index() {
    let (store, _dir) = create_test_store();
    let mut record = spec("0a1b2c3d", "login");
    store.insert(&record).unwrap();

    record.phase = Phase::Decomposed;
    record.tasks.push(Task::new("T1", "First"));
    record.history.clear();
    store.save(&mut record).unwrap();

    let loaded = store.load("0a1b2c3d").unwrap();
    assert_eq!(loaded.phase, Phase::Decomposed);
    assert_eq!(loaded.tasks.len(), 1);

    let active = store.list_active().unwrap();
    assert_eq!(active[0].phase, Phase::Decomposed);
    assert_eq!(active[0].tasks.total, 1);
}

#[test]
fn test_save_unknown_spec_is_not_found() {
    let (store, _dir) = create_test_store();
    let mut record = spec("0a1b2c3d", "login");
    let err = store.save(&mut record).unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound { .. }));
}

#[test]
fn test_crash_before_rename_keeps_previous_record() {
    let (store, _dir) = create_test_store();
    let mut record = spec("0a1b2c3d", "login");
    store.insert(&record).unwrap();

    record.phase = Phase::Defined;
    let json = serde_json::to_vec_pretty(&record).unwrap();
    let path = store.layout().state_file("0a1b2c3d");
    let staging = atomic::stage(&path, &json).unwrap().abandon();
    assert!(staging.exists());

    let loaded = store.load("0a1b2c3d").unwrap();
    assert_eq!(loaded.phase, Phase::New);
    assert_eq!(store.list_active().unwrap().len(), 1);
    assert_eq!(store.rebuild_index().unwrap().len(), 1);
}

#[test]
fn test_crash_after_rename_exposes_new_record() {
    let (store, _dir) = create_test_store();
    let mut record = spec("0a1b2c3d", "login");
    store.insert(&record).unwrap();

    crate::phase::record_transition(&mut record, Phase::Defined, false);
    let json = serde_json::to_vec_pretty(&record).unwrap();
    let path = store.layout().state_file("0a1b2c3d");
    atomic::stage(&path, &json).unwrap().commit().unwrap();

    assert_eq!(store.load("0a1b2c3d").unwrap().phase, Phase::Defined);
}

#[test]
fn test_corrupt_record_is_reported() {
    let (store, _dir) = create_test_store();
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
    let path = store.layout().state_file("0a1b2c3d");
    let json = fs::read_to_string(&path).unwrap().replace("\"new\"", "\"bogus\"");
    fs::write(&path, json).unwrap();

    let err = store.load("0a1b2c3d").unwrap_err();
    assert!(matches!(err, OrchestratorError::CorruptState { .. }));
    assert!(matches!(
        store.rebuild_index().unwrap_err(),
        OrchestratorError::CorruptState { .. }
    ));
}

#[test]
fn test_move_to_archive() {
    let (store, _dir) = create_test_store();
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
    store.insert(&spec("11111111", "search")).unwrap();

    store.move_to_archive("0a1b2c3d").unwrap();

    let active = store.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "11111111");
    assert!(matches!(
        store.load("0a1b2c3d").unwrap_err(),
        OrchestratorError::NotFound { .. }
    ));

    let archived = store.load_archived("0a1b2c3d").unwrap();
    assert_eq!(archived.name, "login");
    assert_eq!(store.list_archived().unwrap().len(), 1);

    let state = store.layout().completed_spec_dir("0a1b2c3d").join("state.json");
    assert!(fs::metadata(state).unwrap().permissions().readonly());

    let err = store.move_to_archive("0a1b2c3d").unwrap_err();
    assert!(matches!(err, OrchestratorError::AlreadyArchived { .. }));
    let err = store.move_to_archive("deadbeef").unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound { .. }));
}

#[test]
fn test_archived_name_can_be_reused() {
    let (store, _dir) = create_test_store();
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
    store.move_to_archive("0a1b2c3d").unwrap();
    store.insert(&spec("11111111", "login")).unwrap();
    assert_eq!(store.find_by_name("login").unwrap().unwrap().id, "11111111");
}

#[test]
fn test_tombstone_and_remove() {
    let (store, _dir) = create_test_store();
    let mut first = spec("0a1b2c3d", "login");
    store.insert(&first).unwrap();
    store.insert(&spec("11111111", "search")).unwrap();

    store.tombstone(&mut first).unwrap();
    assert!(first.cancelled_at.is_some());
    let tomb = store.layout().cancelled_spec_dir("0a1b2c3d").join("state.json");
    assert!(tomb.is_file());

    store.remove("11111111").unwrap();
    assert!(!store.spec_dir("11111111").exists());
    assert!(store.list_active().unwrap().is_empty());
}

#[test]
fn test_rebuild_index_from_records() {
    let (store, _dir) = create_test_store();
    store.insert(&spec("0a1b2c3d", "login")).unwrap();
    store.insert(&spec("11111111", "search")).unwrap();
    fs::remove_file(store.layout().index_file()).unwrap();

    assert!(store.list_active().unwrap().is_empty());
    let rebuilt = store.rebuild_index().unwrap();
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(store.list_active().unwrap().len(), 2);
}
