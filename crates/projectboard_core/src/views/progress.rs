//! Completion arithmetic for dashboards and note cards.

use crate::model::note::CheckItem;
use crate::model::task::{Task, TaskStatus};

/// Completion counts for a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
}

impl Progress {
    /// Whole percentage, rounded down; 0 for an empty set.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // completed <= total, so the quotient is at most 100.
        (self.completed * 100 / self.total) as u8
    }
}

/// Tasks with status `done` versus all tasks.
pub fn task_progress(tasks: &[Task]) -> Progress {
    Progress {
        total: tasks.len(),
        completed: tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Done)
            .count(),
    }
}

/// Checked items versus all items.
pub fn checklist_progress(items: &[CheckItem]) -> Progress {
    Progress {
        total: items.len(),
        completed: items.iter().filter(|item| item.checked).count(),
    }
}

/// Task counts per status, in `TaskStatus::ALL` order.
pub fn status_breakdown(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .iter()
        .map(|status| {
            (
                *status,
                tasks.iter().filter(|task| task.status == *status).count(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{checklist_progress, status_breakdown, task_progress, Progress};
    use crate::model::note::CheckItem;
    use crate::model::task::{Task, TaskStatus};
    use uuid::Uuid;

    #[test]
    fn percent_rounds_down_and_handles_empty() {
        assert_eq!(Progress::default().percent(), 0);
        assert_eq!(
            Progress {
                total: 3,
                completed: 2
            }
            .percent(),
            66
        );
    }

    #[test]
    fn task_progress_counts_done_only() {
        let project_id = Uuid::new_v4();
        let mut done = Task::new(project_id, "done");
        done.status = TaskStatus::Done;
        let mut review = Task::new(project_id, "review");
        review.status = TaskStatus::Review;

        let tasks = [done, review];
        let progress = task_progress(&tasks);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percent(), 50);

        let breakdown = status_breakdown(&tasks);
        assert_eq!(breakdown[2], (TaskStatus::Review, 1));
        assert_eq!(breakdown[3], (TaskStatus::Done, 1));
    }

    #[test]
    fn checklist_progress_counts_checked_items() {
        let note_id = Uuid::new_v4();
        let mut checked = CheckItem::new(note_id, "Define color palette");
        checked.checked = true;
        let open = CheckItem::new(note_id, "Create component library");

        let progress = checklist_progress(&[checked, open]);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.completed, 1);
    }
}
