#![forbid(unsafe_code)]

use tm_storage::{SqliteStore, StoreConfig, StoreError};

#[test]
fn database_file_comes_from_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = StoreConfig::from_toml_str(
        r#"
        [store]
        batch_size = 10
        database_file = "custom.db"
        "#,
    )
    .expect("parse config");

    let store = SqliteStore::open_with_config(dir.path(), config.clone()).expect("open store");
    assert_eq!(store.config(), &config);
    assert_eq!(store.storage_dir(), Some(dir.path()));
    assert!(dir.path().join("custom.db").exists());
}

#[test]
fn reopening_keeps_schema_and_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project_id = {
        let mut store = SqliteStore::open(dir.path()).expect("open store");
        store
            .write(|work| work.create_project("Acme"))
            .expect("project")
            .project_id
    };

    let store = SqliteStore::open(dir.path()).expect("reopen store");
    let project = store
        .get_project(project_id)
        .expect("get project")
        .expect("project persisted");
    assert_eq!(project.name, "Acme");
}

#[test]
fn invalid_config_is_refused_before_opening() {
    let config = StoreConfig {
        batch_size: 0,
        ..StoreConfig::default()
    };
    let err = SqliteStore::open_in_memory(config).expect_err("zero batch size");
    assert!(matches!(err, StoreError::Config(_)), "{err:?}");
}

#[test]
fn dropped_unit_of_work_rolls_back() {
    let mut store = SqliteStore::open_in_memory(StoreConfig::default()).expect("open store");
    {
        let mut work = store.unit_of_work().expect("unit of work");
        work.create_project("Ghost").expect("project");
    }
    store
        .write(|work| work.create_project("Ghost"))
        .expect("name is free after rollback");
}

#[test]
fn explicit_rollback_discards_the_unit_of_work() {
    let mut store = SqliteStore::open_in_memory(StoreConfig::default()).expect("open store");
    let mut work = store.unit_of_work().expect("unit of work");
    let ghost = work.create_project("Ghost").expect("project");
    work.rollback().expect("rollback");

    assert!(
        store
            .get_project(ghost.project_id)
            .expect("get project")
            .is_none()
    );
}
