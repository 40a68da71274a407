use chrono::{Duration, Utc};
use projectboard_core::{
    MemoryBackend, NewEvent, NewTask, ProjectStore, StoreOptions, TaskStatus,
};

fn store_without_default_columns() -> ProjectStore<MemoryBackend> {
    let options = StoreOptions {
        provision_default_columns: false,
        ..StoreOptions::default()
    };
    let mut store = ProjectStore::new(MemoryBackend::new(), options);
    store.init().unwrap();
    store
}

#[test]
fn deleting_a_column_hands_its_tasks_to_the_next_column() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let todo = store.add_board_column(project.id, "To Do").unwrap().unwrap();
    let doing = store.add_board_column(project.id, "Doing").unwrap().unwrap();
    assert_eq!((todo.position, doing.position), (0, 1));

    let task = store
        .add_task(
            NewTask::new(project.id, "Write copy")
                .in_column(todo.id)
                .with_status(TaskStatus::Todo),
        )
        .unwrap()
        .unwrap();

    let names: Vec<String> = store
        .get_project_board_columns(project.id)
        .into_iter()
        .map(|column| column.name)
        .collect();
    assert_eq!(names, vec!["To Do", "Doing"]);

    assert!(store.delete_board_column(todo.id).unwrap());

    let moved = store.task(task.id).unwrap();
    assert_eq!(moved.column_id, Some(doing.id));
    assert_eq!(moved.status, TaskStatus::Todo);
    assert!(store.board_column(todo.id).is_none());
}

#[test]
fn moved_tasks_are_appended_after_existing_ones() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let todo = store.add_board_column(project.id, "To Do").unwrap().unwrap();
    let doing = store.add_board_column(project.id, "Doing").unwrap().unwrap();

    store
        .add_task(NewTask::new(project.id, "Existing").in_column(doing.id))
        .unwrap()
        .unwrap();
    store
        .add_task(NewTask::new(project.id, "Second").in_column(todo.id).at_position(5))
        .unwrap()
        .unwrap();
    store
        .add_task(NewTask::new(project.id, "First").in_column(todo.id).at_position(1))
        .unwrap()
        .unwrap();

    store.delete_board_column(todo.id).unwrap();

    let titles: Vec<String> = store
        .get_column_tasks(doing.id)
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["Existing", "First", "Second"]);
}

#[test]
fn deleting_the_last_column_clears_task_columns() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let only = store.add_board_column(project.id, "Only").unwrap().unwrap();
    let task = store
        .add_task(NewTask::new(project.id, "Write copy"))
        .unwrap()
        .unwrap();
    assert_eq!(task.column_id, Some(only.id));

    assert!(store.delete_board_column(only.id).unwrap());
    assert_eq!(store.task(task.id).unwrap().column_id, None);
    assert!(!store.delete_board_column(only.id).unwrap());
}

#[test]
fn deleting_a_note_removes_its_check_items() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let note = store
        .add_note(project.id, "Launch checklist", "")
        .unwrap()
        .unwrap();
    let draft = store.add_check_item(note.id, "Draft").unwrap().unwrap();
    let review = store.add_check_item(note.id, "Review").unwrap().unwrap();

    store.toggle_check_item(draft.id).unwrap().unwrap();
    let items = store.get_note_check_items(note.id);
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|item| item.id == draft.id && item.checked));
    assert!(items.iter().any(|item| item.id == review.id && !item.checked));

    assert!(store.delete_note(note.id).unwrap());
    assert!(store.check_items().is_empty());
    assert!(store.notes().is_empty());
}

#[test]
fn deleting_a_task_removes_its_comments() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let task = store.add_task(NewTask::new(project.id, "A")).unwrap().unwrap();
    let keep = store.add_task(NewTask::new(project.id, "B")).unwrap().unwrap();
    store.add_comment(task.id, "one").unwrap().unwrap();
    store.add_comment(task.id, "two").unwrap().unwrap();
    store.add_comment(keep.id, "stays").unwrap().unwrap();

    assert!(store.delete_task(task.id).unwrap());
    assert_eq!(store.comments().len(), 1);
    assert_eq!(store.comments()[0].task_id, keep.id);
    assert!(!store.delete_task(task.id).unwrap());
}

#[test]
fn deleting_a_project_removes_everything_it_owns() {
    let mut store = ProjectStore::new(MemoryBackend::new(), StoreOptions::default());
    store.init().unwrap();
    let launch = store.add_project("Launch", "").unwrap().unwrap();
    let other = store.add_project("Other", "").unwrap().unwrap();

    let task = store.add_task(NewTask::new(launch.id, "A")).unwrap().unwrap();
    store.add_comment(task.id, "hello").unwrap().unwrap();
    let note = store.add_note(launch.id, "N", "").unwrap().unwrap();
    store.add_check_item(note.id, "item").unwrap().unwrap();
    let now = Utc::now();
    store
        .add_event(NewEvent::new(launch.id, "Kickoff", now, now + Duration::hours(1)))
        .unwrap()
        .unwrap();
    store.add_task(NewTask::new(other.id, "Survivor")).unwrap().unwrap();

    store.set_current_project(Some(launch.id));
    assert!(store.delete_project(launch.id).unwrap());

    assert_eq!(store.projects().len(), 1);
    assert!(store.current_project().is_none());
    assert!(store.comments().is_empty());
    assert!(store.notes().is_empty());
    assert!(store.check_items().is_empty());
    assert!(store.events().is_empty());
    assert_eq!(store.tasks().len(), 1);
    assert!(store
        .board_columns()
        .iter()
        .all(|column| column.project_id == other.id));
    assert!(!store.delete_project(launch.id).unwrap());
}

#[test]
fn column_delete_renumbers_a_target_lane_that_reached_i32_max() {
    let mut store = store_without_default_columns();
    let project = store.add_project("Launch", "").unwrap().unwrap();
    let todo = store.add_board_column(project.id, "To Do").unwrap().unwrap();
    let doing = store.add_board_column(project.id, "Doing").unwrap().unwrap();

    let moved = store
        .add_task(NewTask::new(project.id, "Write copy").in_column(todo.id))
        .unwrap()
        .unwrap();
    let low = store
        .add_task(NewTask::new(project.id, "Low").in_column(doing.id).at_position(3))
        .unwrap()
        .unwrap();
    let high = store
        .add_task(
            NewTask::new(project.id, "High")
                .in_column(doing.id)
                .at_position(i32::MAX),
        )
        .unwrap()
        .unwrap();

    assert!(store.delete_board_column(todo.id).unwrap());

    let lane: Vec<(String, i32)> = store
        .get_column_tasks(doing.id)
        .into_iter()
        .map(|task| (task.title, task.position))
        .collect();
    assert_eq!(
        lane,
        vec![
            ("Low".to_string(), 0),
            ("High".to_string(), 1),
            ("Write copy".to_string(), 2),
        ]
    );
    assert_eq!(store.task(low.id).unwrap().column_id, Some(doing.id));
    assert_eq!(store.task(high.id).unwrap().column_id, Some(doing.id));
    assert_eq!(store.task(moved.id).unwrap().column_id, Some(doing.id));
}
