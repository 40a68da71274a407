//! Demo data set for the in-memory backend.
//!
//! # Responsibility
//! - Build a small, self-consistent workspace for demos and tests.
//!
//! # Invariants
//! - Every child row references a parent present in the same snapshot.
//! - Each task sits in the default column whose index matches its status.

use crate::backend::Snapshot;
use crate::model::column::BoardColumn;
use crate::model::event::CalendarEvent;
use crate::model::note::{CheckItem, Note};
use crate::model::project::Project;
use crate::model::task::{Comment, Task, TaskStatus};
use crate::model::EntityId;
use chrono::{DateTime, Duration, Utc};

struct SeedTask {
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    due_in_days: i64,
}

const WEBSITE_TASKS: [SeedTask; 4] = [
    SeedTask {
        title: "Create design mockups",
        description: "Create initial mockups for homepage and key sections",
        status: TaskStatus::Done,
        due_in_days: 1,
    },
    SeedTask {
        title: "Frontend development",
        description: "Implement the new design in React",
        status: TaskStatus::InProgress,
        due_in_days: 7,
    },
    SeedTask {
        title: "Backend API updates",
        description: "Update API endpoints for new features",
        status: TaskStatus::Todo,
        due_in_days: 14,
    },
    SeedTask {
        title: "Testing and QA",
        description: "Comprehensive testing of new website",
        status: TaskStatus::Todo,
        due_in_days: 21,
    },
];

const MOBILE_TASKS: [SeedTask; 2] = [
    SeedTask {
        title: "App wireframing",
        description: "Create wireframes for key app screens",
        status: TaskStatus::Done,
        due_in_days: -3,
    },
    SeedTask {
        title: "UI Design",
        description: "Design UI components and screens",
        status: TaskStatus::InProgress,
        due_in_days: 5,
    },
];

fn column_index(status: TaskStatus) -> usize {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Review => 2,
        TaskStatus::Done => 3,
    }
}

fn project(snapshot: &mut Snapshot, name: &str, description: &str, now: DateTime<Utc>) -> EntityId {
    let mut project = Project::new(name, description);
    project.created_at = now;
    let project_id = project.id;
    snapshot.projects.push(project);

    for mut column in BoardColumn::defaults_for(project_id) {
        column.created_at = now;
        snapshot.board_columns.push(column);
    }
    project_id
}

fn tasks(
    snapshot: &mut Snapshot,
    project_id: EntityId,
    seeds: &[SeedTask],
    now: DateTime<Utc>,
) -> Vec<EntityId> {
    let columns: Vec<EntityId> = snapshot
        .board_columns
        .iter()
        .filter(|column| column.project_id == project_id)
        .map(|column| column.id)
        .collect();

    let mut ids = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let column_id = columns.get(column_index(seed.status)).copied();
        let position = snapshot
            .tasks
            .iter()
            .filter(|task| task.column_id.is_some() && task.column_id == column_id)
            .count() as i32;

        let mut task = Task::new(project_id, seed.title);
        task.description = seed.description.to_string();
        task.status = seed.status;
        task.column_id = column_id;
        task.position = position;
        task.due_date = Some(now + Duration::days(seed.due_in_days));
        task.created_at = now;
        task.updated_at = now;
        ids.push(task.id);
        snapshot.tasks.push(task);
    }
    ids
}

fn comment(snapshot: &mut Snapshot, task_id: EntityId, content: &str, now: DateTime<Utc>) {
    let mut comment = Comment::new(task_id, content);
    comment.created_at = now;
    snapshot.comments.push(comment);
}

fn note(
    snapshot: &mut Snapshot,
    project_id: EntityId,
    title: &str,
    content: &str,
    items: &[(&str, bool)],
    now: DateTime<Utc>,
) {
    let mut note = Note::new(project_id, title, content);
    note.created_at = now;
    for (content, checked) in items {
        let mut item = CheckItem::new(note.id, *content);
        item.checked = *checked;
        item.created_at = now;
        snapshot.check_items.push(item);
    }
    snapshot.notes.push(note);
}

fn event(
    snapshot: &mut Snapshot,
    project_id: EntityId,
    title: &str,
    description: &str,
    start: DateTime<Utc>,
    hours: i64,
    now: DateTime<Utc>,
) {
    let mut event = CalendarEvent::new(project_id, title, start, start + Duration::hours(hours));
    event.description = description.to_string();
    event.created_at = now;
    snapshot.events.push(event);
}

/// Builds the demo workspace with dates relative to `now`.
pub fn seed_snapshot(now: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::default();

    let website = project(
        &mut snapshot,
        "Website Redesign",
        "Complete overhaul of company website with new branding",
        now,
    );
    let mobile = project(
        &mut snapshot,
        "Mobile App Development",
        "Create a companion mobile app for our service",
        now,
    );
    project(
        &mut snapshot,
        "Marketing Campaign",
        "Q3 digital marketing campaign for product launch",
        now,
    );

    let website_tasks = tasks(&mut snapshot, website, &WEBSITE_TASKS, now);
    tasks(&mut snapshot, mobile, &MOBILE_TASKS, now);

    comment(
        &mut snapshot,
        website_tasks[0],
        "Mockups look great! Ready for development.",
        now,
    );
    comment(
        &mut snapshot,
        website_tasks[1],
        "Working on responsive layouts now.",
        now,
    );

    note(
        &mut snapshot,
        website,
        "Design System",
        "Notes about our design system components",
        &[("Define color palette", true), ("Create component library", false)],
        now,
    );
    note(
        &mut snapshot,
        mobile,
        "App Requirements",
        "Key requirements for the mobile app",
        &[("User profile screens", true), ("Payment integration", false)],
        now,
    );

    event(
        &mut snapshot,
        website,
        "Design Review",
        "Review website mockups with team",
        now + Duration::days(2),
        2,
        now,
    );
    event(
        &mut snapshot,
        website,
        "Client Presentation",
        "Present website design to client",
        now + Duration::days(5),
        1,
        now,
    );

    snapshot
}

#[cfg(test)]
mod tests {
    use super::seed_snapshot;
    use crate::backend::Change;
    use crate::model::task::TaskStatus;
    use chrono::Utc;

    #[test]
    fn seed_has_expected_shape() {
        let snapshot = seed_snapshot(Utc::now());
        assert_eq!(snapshot.projects.len(), 3);
        assert_eq!(snapshot.board_columns.len(), 12);
        assert_eq!(snapshot.tasks.len(), 6);
        assert_eq!(snapshot.comments.len(), 2);
        assert_eq!(snapshot.notes.len(), 2);
        assert_eq!(snapshot.check_items.len(), 4);
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.projects[0].name, "Website Redesign");
    }

    #[test]
    fn tasks_sit_in_the_column_matching_their_status() {
        let snapshot = seed_snapshot(Utc::now());
        for task in &snapshot.tasks {
            let column = snapshot
                .board_columns
                .iter()
                .find(|column| Some(column.id) == task.column_id)
                .unwrap();
            assert_eq!(column.project_id, task.project_id);
            let expected = TaskStatus::ALL
                .iter()
                .position(|status| *status == task.status)
                .unwrap() as u32;
            assert_eq!(column.position, expected);
        }
    }

    #[test]
    fn every_row_is_valid() {
        for change in seed_snapshot(Utc::now()).to_inserts() {
            if let Change::Insert(record) = change {
                record.validate().unwrap();
            }
        }
    }
}
