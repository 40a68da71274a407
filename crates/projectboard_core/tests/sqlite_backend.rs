use chrono::{Duration, TimeZone, Utc};
use projectboard_core::db::DEFAULT_BUSY_TIMEOUT;
use projectboard_core::{
    seed_snapshot, Backend, BackendError, Change, NewEvent, NewTask, Project, ProjectStore,
    Record, SqliteBackend, StoreError, StoreOptions, TaskStatus,
};
use std::path::Path;

fn open_store(path: &Path) -> ProjectStore<SqliteBackend> {
    let backend = SqliteBackend::open(path, DEFAULT_BUSY_TIMEOUT).unwrap();
    let mut store = ProjectStore::new(backend, StoreOptions::default());
    store.init().unwrap();
    store
}

#[test]
fn store_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let due = Utc.with_ymd_and_hms(2026, 6, 1, 12, 30, 0).unwrap();

    let expected = {
        let mut store = open_store(&path);
        let project = store.add_project("Launch", "Q3 go-live").unwrap().unwrap();
        let task = store
            .add_task(
                NewTask::new(project.id, "Write copy")
                    .with_status(TaskStatus::InProgress)
                    .with_due_date(due),
            )
            .unwrap()
            .unwrap();
        store.add_comment(task.id, "draft attached").unwrap().unwrap();
        let note = store.add_note(project.id, "Checklist", "").unwrap().unwrap();
        let item = store.add_check_item(note.id, "Draft").unwrap().unwrap();
        store.toggle_check_item(item.id).unwrap().unwrap();
        store
            .add_event(NewEvent::new(
                project.id,
                "Kickoff",
                due,
                due + Duration::hours(1),
            ))
            .unwrap()
            .unwrap();
        store.snapshot()
    };

    let reopened = open_store(&path);
    assert_eq!(reopened.snapshot(), expected);
    assert_eq!(reopened.tasks()[0].due_date, Some(due));
    assert!(reopened.check_items()[0].checked);
}

#[test]
fn column_delete_is_persisted_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let (todo, doing, task_id) = {
        let mut store = open_store(&path);
        let project = store.add_project("Launch", "").unwrap().unwrap();
        let columns = store.get_project_board_columns(project.id);
        let task = store
            .add_task(NewTask::new(project.id, "Write copy"))
            .unwrap()
            .unwrap();
        assert!(store.delete_board_column(columns[0].id).unwrap());
        (columns[0].id, columns[1].id, task.id)
    };

    let reopened = open_store(&path);
    assert!(reopened.board_column(todo).is_none());
    assert_eq!(reopened.task(task_id).unwrap().column_id, Some(doing));
}

#[test]
fn project_delete_removes_children_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    {
        let mut store = open_store(&path);
        let project = store.add_project("Launch", "").unwrap().unwrap();
        let task = store.add_task(NewTask::new(project.id, "A")).unwrap().unwrap();
        store.add_comment(task.id, "hello").unwrap().unwrap();
        assert!(store.delete_project(project.id).unwrap());
    }

    let reopened = open_store(&path);
    assert_eq!(reopened.snapshot().row_count(), 0);
}

#[test]
fn update_of_missing_row_fails_and_rolls_back_batch() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let kept = Project::new("Kept", "");
    let missing = Project::new("Missing", "");

    let err = backend
        .commit(&[
            Change::Insert(Record::Project(kept.clone())),
            Change::Update(Record::Project(missing)),
        ])
        .unwrap_err();
    assert!(matches!(err, BackendError::NotFound { .. }));
    assert!(backend.load_snapshot().unwrap().projects.is_empty());

    backend
        .commit(&[Change::Insert(Record::Project(kept.clone()))])
        .unwrap();
    assert_eq!(backend.load_snapshot().unwrap().projects, vec![kept]);
}

#[test]
fn seed_snapshot_round_trips_through_sqlite() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let seed = seed_snapshot(Utc::now());

    backend.commit(&seed.to_inserts()).unwrap();
    assert_eq!(backend.load_snapshot().unwrap(), seed);
    assert!(backend.subscribe().is_none());
}

#[test]
fn corrupt_rows_surface_as_invalid_data() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend
        .connection()
        .execute(
            "INSERT INTO projects (id, name, description, created_at)
             VALUES ('not-a-uuid', 'Broken', '', '2026-01-01T00:00:00Z');",
            [],
        )
        .unwrap();

    let err = backend.load_snapshot().unwrap_err();
    assert!(matches!(err, BackendError::InvalidData(_)));
}

#[test]
fn locked_database_times_out_and_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let busy_timeout = std::time::Duration::from_millis(50);

    let holder = SqliteBackend::open(&path, busy_timeout).unwrap();
    let backend = SqliteBackend::open(&path, busy_timeout).unwrap();
    let mut store = ProjectStore::new(backend, StoreOptions::default());
    store.init().unwrap();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let before = store.snapshot();

    holder.connection().execute_batch("BEGIN IMMEDIATE;").unwrap();
    let err = store
        .add_task(NewTask::new(project.id, "Write copy"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(BackendError::Timeout)));
    assert_eq!(store.snapshot(), before);

    holder.connection().execute_batch("ROLLBACK;").unwrap();
    assert!(store
        .add_task(NewTask::new(project.id, "Write copy"))
        .unwrap()
        .is_some());
}
