//! Merge of changes pushed by the backend (other sessions, or echoes of our
//! own commits).
//!
//! # Invariants
//! - Merge is idempotent by id.
//! - Rows whose parent is absent are ignored, so foreign keys stay live.
//! - Deleting a parent cascades locally exactly like a local delete.

use super::cascade::{plan_column_delete, plan_note_delete, plan_project_delete, plan_task_delete};
use super::{ProjectStore, StoreState};
use crate::backend::{Backend, Change, EntityKind, Record};
use chrono::Utc;
use log::{debug, warn};
use std::sync::mpsc::TryRecvError;

impl<B: Backend> ProjectStore<B> {
    /// Merges one pushed change. Returns whether any row was touched.
    pub fn apply_remote(&mut self, change: Change) -> bool {
        if self.state == StoreState::Loading {
            debug!(
                "event=remote_merge module=store status=skip op={} reason=loading",
                change.op()
            );
            return false;
        }

        match &change {
            Change::Insert(record) | Change::Update(record) => {
                if !self.parents_present(record) {
                    warn!(
                        "event=remote_merge module=store status=skip op={} table={} reason=missing_parent",
                        change.op(),
                        record.kind().table()
                    );
                    return false;
                }
                self.data.apply(&change)
            }
            Change::Delete { kind, id } => {
                let plan = match kind {
                    EntityKind::Project => plan_project_delete(&self.data, *id),
                    EntityKind::Task => plan_task_delete(&self.data, *id),
                    EntityKind::Note => plan_note_delete(&self.data, *id),
                    EntityKind::BoardColumn => plan_column_delete(&self.data, *id, Utc::now()),
                    _ => vec![change.clone()],
                };
                let mut touched = false;
                for planned in &plan {
                    touched |= self.data.apply(planned);
                }
                if *kind == EntityKind::Project && self.current_project == Some(*id) {
                    self.current_project = None;
                }
                touched
            }
        }
    }

    /// Drains the push channel. Returns the number of changes that touched
    /// at least one row.
    pub fn sync_remote(&mut self) -> usize {
        let mut pending = Vec::new();
        let mut closed = false;
        if let Some(receiver) = self.remote.as_ref() {
            loop {
                match receiver.try_recv() {
                    Ok(change) => pending.push(change),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }
        if closed {
            warn!("event=remote_merge module=store status=error reason=channel_closed");
            self.remote = None;
        }

        let received = pending.len();
        let mut merged = 0;
        for change in pending {
            if self.apply_remote(change) {
                merged += 1;
            }
        }
        if received > 0 {
            debug!("event=remote_merge module=store status=ok received={received} merged={merged}");
        }
        merged
    }

    fn parents_present(&self, record: &Record) -> bool {
        match record {
            Record::Project(_) => true,
            Record::BoardColumn(row) => self.project(row.project_id).is_some(),
            Record::Task(row) => {
                self.project(row.project_id).is_some()
                    && row
                        .column_id
                        .map_or(true, |column_id| self.board_column(column_id).is_some())
            }
            Record::Comment(row) => self.task(row.task_id).is_some(),
            Record::Note(row) => self.project(row.project_id).is_some(),
            Record::CheckItem(row) => self.note(row.note_id).is_some(),
            Record::Event(row) => self.project(row.project_id).is_some(),
        }
    }
}
