use chrono::{Duration, Utc};
use projectboard_core::views::board::{board_lanes, due_status, DueStatus};
use projectboard_core::views::gantt::gantt_window;
use projectboard_core::views::notes::note_card;
use projectboard_core::views::progress::task_progress;
use projectboard_core::views::timeline::timeline;
use projectboard_core::{
    seed_snapshot, Change, EntityKind, MemoryBackend, ProjectStore, Snapshot, StoreOptions,
};

fn seeded_store() -> ProjectStore<MemoryBackend> {
    let backend = MemoryBackend::with_snapshot(seed_snapshot(Utc::now()));
    let mut store = ProjectStore::new(backend, StoreOptions::default());
    store.init().unwrap();
    store
}

#[test]
fn seeded_store_selects_website_redesign() {
    let store = seeded_store();
    let current = store.current_project().unwrap();
    assert_eq!(current.name, "Website Redesign");
    assert_eq!(store.projects().len(), 3);
}

#[test]
fn website_board_places_tasks_by_status() {
    let store = seeded_store();
    let project = store.current_project().unwrap().clone();
    let board = board_lanes(
        &store.get_project_board_columns(project.id),
        &store.get_project_tasks(project.id),
    );

    let counts: Vec<(String, usize)> = board
        .lanes
        .iter()
        .map(|lane| (lane.column.name.clone(), lane.tasks.len()))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("To Do".to_string(), 2),
            ("In Progress".to_string(), 1),
            ("Review".to_string(), 0),
            ("Done".to_string(), 1),
        ]
    );
    assert!(board.unplaced.is_empty());
    assert_eq!(board.lanes[0].tasks[0].title, "Backend API updates");
}

#[test]
fn mobile_tasks_report_overdue_and_progress() {
    let store = seeded_store();
    let mobile = store
        .projects()
        .iter()
        .find(|project| project.name == "Mobile App Development")
        .unwrap()
        .clone();
    let tasks = store.get_project_tasks(mobile.id);
    let now = Utc::now();

    let wireframing = tasks.iter().find(|task| task.title == "App wireframing").unwrap();
    assert_eq!(due_status(wireframing.due_date, now), DueStatus::Overdue);

    let progress = task_progress(&tasks);
    assert_eq!((progress.completed, progress.total, progress.percent()), (1, 2, 50));

    let marketing = store
        .projects()
        .iter()
        .find(|project| project.name == "Marketing Campaign")
        .unwrap();
    assert_eq!(task_progress(&store.get_project_tasks(marketing.id)).percent(), 0);
}

#[test]
fn gantt_and_timeline_cover_seeded_tasks() {
    let store = seeded_store();
    let project = store.current_project().unwrap().clone();
    let tasks = store.get_project_tasks(project.id);

    let window = gantt_window(&tasks).unwrap();
    let today = Utc::now().date_naive();
    assert!(window.start <= today - Duration::days(7));
    assert!(window.end >= today + Duration::days(21 + 7));

    let days = timeline(&tasks, &store.get_project_events(project.id));
    let entries: usize = days.iter().map(|day| day.entries.len()).sum();
    assert_eq!(entries, 6);
}

#[test]
fn design_system_card_counts_checked_items() {
    let store = seeded_store();
    let project = store.current_project().unwrap().clone();
    let note = store.get_project_notes(project.id).remove(0);

    let card = note_card(&note, &store.get_note_check_items(note.id));
    assert_eq!(card.title, "Design System");
    assert_eq!((card.checked, card.total), (1, 2));
    assert_eq!(
        card.excerpt.as_deref(),
        Some("Notes about our design system components")
    );
}

#[test]
fn snapshot_exports_as_json_and_back() {
    let store = seeded_store();
    let snapshot = store.snapshot();

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let value = serde_json::to_value(&snapshot.tasks[0]).unwrap();
    assert_eq!(value["status"], "done");
}

#[test]
fn change_messages_use_tagged_json() {
    let id = seed_snapshot(Utc::now()).projects[0].id;
    let change = Change::Delete {
        kind: EntityKind::BoardColumn,
        id,
    };

    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value["op"], "delete");
    assert_eq!(value["data"]["kind"], "board_column");
    assert_eq!(value["data"]["id"], id.to_string());
}
