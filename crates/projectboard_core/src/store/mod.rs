//! Project data store.
//!
//! # Responsibility
//! - Hold the authoritative in-memory copy of every entity for a session.
//! - Provide create/update/delete mutators and filter-by-parent views.
//! - Forward every mutation to a `Backend` and merge its push notifications.
//!
//! # Invariants
//! - Lifecycle is `Loading -> Ready`, entered once per `init`.
//! - Mutations are applied in memory only after the backend confirmed the
//!   whole change batch; a failed commit leaves every collection unchanged.
//! - Every foreign key references a live parent or is `None`.
//! - Validation rejections and calls made while loading are no-ops, never
//!   errors.
//! - Derived views return fresh copies and never mutate collections.

use crate::backend::{Backend, BackendError, Change, EntityKind, Record, Snapshot};
use crate::model::column::{sort_by_position, BoardColumn};
use crate::model::event::CalendarEvent;
use crate::model::note::{CheckItem, Note};
use crate::model::project::Project;
use crate::model::task::{Comment, Task, TaskStatus};
use crate::model::EntityId;
use crate::views::calendar::events_on;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;
use std::time::Instant;

pub mod cascade;
mod remote;

use cascade::{plan_column_delete, plan_note_delete, plan_project_delete, plan_task_delete};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by a store mutator.
#[derive(Debug)]
pub enum StoreError {
    /// The backend rejected the change batch; nothing was applied.
    Backend(BackendError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "store backend failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

/// Lifecycle state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Initial population outstanding; readers should show a placeholder.
    Loading,
    Ready,
}

/// Behavior switches for a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Create "To Do / In Progress / Review / Done" with every new project.
    pub provision_default_columns: bool,
    /// After `init`, make the first project current when none is set.
    pub select_first_project: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            provision_default_columns: true,
            select_first_project: true,
        }
    }
}

/// Request model for `ProjectStore::add_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: EntityId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// `None` places the task in the project's lowest-position column.
    pub column_id: Option<EntityId>,
    /// `None` appends the task at the end of its column.
    pub position: Option<i32>,
}

impl NewTask {
    pub fn new(project_id: EntityId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            due_date: None,
            column_id: None,
            position: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn in_column(mut self, column_id: EntityId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }
}

/// Request model for `ProjectStore::add_event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub project_id: EntityId,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewEvent {
    pub fn new(
        project_id: EntityId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: String::new(),
            start,
            end,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Session-scoped store of projects and everything they own.
pub struct ProjectStore<B: Backend> {
    backend: B,
    options: StoreOptions,
    data: Snapshot,
    current_project: Option<EntityId>,
    state: StoreState,
    remote: Option<Receiver<Change>>,
}

impl<B: Backend> ProjectStore<B> {
    /// Creates a store in the `Loading` state. Call `init` before use.
    pub fn new(backend: B, options: StoreOptions) -> Self {
        Self {
            backend,
            options,
            data: Snapshot::default(),
            current_project: None,
            state: StoreState::Loading,
            remote: None,
        }
    }

    /// Populates the collections from the backend and moves to `Ready`.
    ///
    /// A population failure still moves the store to `Ready` (with empty
    /// collections) and is returned so the caller can notify the user.
    /// Calling `init` on a ready store is a no-op.
    pub fn init(&mut self) -> StoreResult<()> {
        if self.state == StoreState::Ready {
            return Ok(());
        }

        let started_at = Instant::now();
        info!(
            "event=store_init module=store status=start backend={}",
            self.backend.name()
        );

        // Subscribe first so nothing committed during the load is missed;
        // merging is idempotent.
        self.remote = self.backend.subscribe();
        let loaded = self.backend.load_snapshot();
        self.state = StoreState::Ready;

        match loaded {
            Ok(snapshot) => {
                self.data = snapshot;
                if self.options.select_first_project && self.current_project.is_none() {
                    self.current_project = self.data.projects.first().map(|project| project.id);
                }
                info!(
                    "event=store_init module=store status=ok backend={} rows={} push={} duration_ms={}",
                    self.backend.name(),
                    self.data.row_count(),
                    self.remote.is_some(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                self.data = Snapshot::default();
                error!(
                    "event=store_init module=store status=error backend={} duration_ms={} error={err}",
                    self.backend.name(),
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    /// Closes the push channel, drops all collections and returns to `Loading`.
    pub fn dispose(&mut self) {
        self.remote = None;
        self.data = Snapshot::default();
        self.current_project = None;
        self.state = StoreState::Loading;
        info!(
            "event=store_dispose module=store status=ok backend={}",
            self.backend.name()
        );
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == StoreState::Loading
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // Collections, read-only.

    pub fn projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn board_columns(&self) -> &[BoardColumn] {
        &self.data.board_columns
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn comments(&self) -> &[Comment] {
        &self.data.comments
    }

    pub fn notes(&self) -> &[Note] {
        &self.data.notes
    }

    pub fn check_items(&self) -> &[CheckItem] {
        &self.data.check_items
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.data.events
    }

    /// Copies every collection into a standalone snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.data.clone()
    }

    pub fn project(&self, id: EntityId) -> Option<&Project> {
        self.data.projects.iter().find(|project| project.id == id)
    }

    pub fn task(&self, id: EntityId) -> Option<&Task> {
        self.data.tasks.iter().find(|task| task.id == id)
    }

    pub fn note(&self, id: EntityId) -> Option<&Note> {
        self.data.notes.iter().find(|note| note.id == id)
    }

    pub fn board_column(&self, id: EntityId) -> Option<&BoardColumn> {
        self.data.board_columns.iter().find(|column| column.id == id)
    }

    /// The current project, if it is set and still exists.
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.and_then(|id| self.project(id))
    }

    /// Plain assignment; `None` clears the selection.
    pub fn set_current_project(&mut self, project_id: Option<EntityId>) {
        self.current_project = project_id;
    }

    // Projects.

    /// Creates a project (and its default columns when enabled).
    ///
    /// Returns `Ok(None)` when `name` is blank.
    pub fn add_project(
        &mut self,
        name: &str,
        description: &str,
    ) -> StoreResult<Option<Project>> {
        const OP: &str = "add_project";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            skip(OP, "empty_name");
            return Ok(None);
        }

        let project = Project::new(name, description);
        let mut changes = vec![Change::Insert(Record::Project(project.clone()))];
        if self.options.provision_default_columns {
            changes.extend(
                BoardColumn::defaults_for(project.id)
                    .into_iter()
                    .map(|column| Change::Insert(Record::BoardColumn(column))),
            );
        }
        self.commit(OP, changes)?;
        Ok(Some(project))
    }

    /// Replaces name and description of an existing project.
    pub fn update_project(&mut self, project: &Project) -> StoreResult<Option<Project>> {
        const OP: &str = "update_project";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.project(project.id) else {
            skip(OP, "unknown_project");
            return Ok(None);
        };
        let name = project.name.trim();
        if name.is_empty() {
            skip(OP, "empty_name");
            return Ok(None);
        }

        let updated = Project {
            id: existing.id,
            name: name.to_string(),
            description: project.description.clone(),
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };
        self.commit(OP, vec![Change::Update(Record::Project(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Deletes a project and everything it owns.
    ///
    /// Returns `Ok(false)` when the project does not exist.
    pub fn delete_project(&mut self, id: EntityId) -> StoreResult<bool> {
        const OP: &str = "delete_project";
        if !self.ensure_ready(OP) {
            return Ok(false);
        }
        let plan = plan_project_delete(&self.data, id);
        if plan.is_empty() {
            return Ok(false);
        }
        self.commit(OP, plan)?;
        if self.current_project == Some(id) {
            self.current_project = None;
        }
        Ok(true)
    }

    // Tasks.

    /// Creates a task.
    ///
    /// Rejected (returns `Ok(None)`) when the title is blank, the project is
    /// unknown, the requested column belongs to another project, or no
    /// position is given and the lane is already filled up to `i32::MAX`.
    pub fn add_task(&mut self, request: NewTask) -> StoreResult<Option<Task>> {
        const OP: &str = "add_task";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let title = request.title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }
        if self.project(request.project_id).is_none() {
            skip(OP, "unknown_project");
            return Ok(None);
        }
        let column_id = match request.column_id {
            Some(column_id) if self.column_in_project(column_id, request.project_id) => {
                Some(column_id)
            }
            Some(_) => {
                skip(OP, "foreign_column");
                return Ok(None);
            }
            None => self.first_column(request.project_id),
        };
        let position = match request.position {
            Some(position) => position,
            None => match self.next_task_position(request.project_id, column_id) {
                Some(position) => position,
                None => {
                    skip(OP, "position_overflow");
                    return Ok(None);
                }
            },
        };

        let now = Utc::now();
        let task = Task {
            id: crate::model::new_id(),
            project_id: request.project_id,
            column_id,
            title: title.to_string(),
            description: request.description,
            status: request.status,
            due_date: request.due_date,
            position,
            created_at: now,
            updated_at: now,
        };
        self.commit(OP, vec![Change::Insert(Record::Task(task.clone()))])?;
        Ok(Some(task))
    }

    /// Replaces the editable fields of an existing task.
    ///
    /// The owning project and creation time are kept from the stored task.
    pub fn update_task(&mut self, task: &Task) -> StoreResult<Option<Task>> {
        const OP: &str = "update_task";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.task(task.id) else {
            skip(OP, "unknown_task");
            return Ok(None);
        };
        let title = task.title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }
        if let Some(column_id) = task.column_id {
            if !self.column_in_project(column_id, existing.project_id) {
                skip(OP, "foreign_column");
                return Ok(None);
            }
        }

        let mut updated = Task {
            id: existing.id,
            project_id: existing.project_id,
            created_at: existing.created_at,
            title: title.to_string(),
            ..task.clone()
        };
        updated.touch();
        self.commit(OP, vec![Change::Update(Record::Task(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Changes only the workflow status; column membership is untouched.
    pub fn update_task_status(
        &mut self,
        id: EntityId,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        const OP: &str = "update_task_status";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.task(id) else {
            skip(OP, "unknown_task");
            return Ok(None);
        };

        let mut updated = existing.clone();
        updated.status = status;
        updated.touch();
        self.commit(OP, vec![Change::Update(Record::Task(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Moves a task to another column (or out of every column) without
    /// touching its status. `position = None` appends it to the target.
    ///
    /// Rejected when the target column belongs to another project, or when
    /// appending would overflow the lane's positions.
    pub fn move_task(
        &mut self,
        id: EntityId,
        column_id: Option<EntityId>,
        position: Option<i32>,
    ) -> StoreResult<Option<Task>> {
        const OP: &str = "move_task";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.task(id) else {
            skip(OP, "unknown_task");
            return Ok(None);
        };
        if let Some(column_id) = column_id {
            if !self.column_in_project(column_id, existing.project_id) {
                skip(OP, "foreign_column");
                return Ok(None);
            }
        }

        let mut updated = existing.clone();
        let position = match position {
            Some(position) => position,
            None if updated.column_id == column_id => updated.position,
            None => match self.next_task_position(updated.project_id, column_id) {
                Some(position) => position,
                None => {
                    skip(OP, "position_overflow");
                    return Ok(None);
                }
            },
        };
        updated.column_id = column_id;
        updated.position = position;
        updated.touch();
        self.commit(OP, vec![Change::Update(Record::Task(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Deletes a task and its comments. Idempotent.
    pub fn delete_task(&mut self, id: EntityId) -> StoreResult<bool> {
        const OP: &str = "delete_task";
        if !self.ensure_ready(OP) {
            return Ok(false);
        }
        let plan = plan_task_delete(&self.data, id);
        if plan.is_empty() {
            return Ok(false);
        }
        self.commit(OP, plan)?;
        Ok(true)
    }

    /// Tasks of a project in collection order.
    pub fn get_project_tasks(&self, project_id: EntityId) -> Vec<Task> {
        self.data
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Tasks placed in a column, sorted by position (ties in insertion order).
    pub fn get_column_tasks(&self, column_id: EntityId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .data
            .tasks
            .iter()
            .filter(|task| task.column_id == Some(column_id))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.position);
        tasks
    }

    // Comments.

    pub fn add_comment(
        &mut self,
        task_id: EntityId,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        const OP: &str = "add_comment";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let content = content.trim();
        if content.is_empty() {
            skip(OP, "empty_content");
            return Ok(None);
        }
        if self.task(task_id).is_none() {
            skip(OP, "unknown_task");
            return Ok(None);
        }

        let comment = Comment::new(task_id, content);
        self.commit(OP, vec![Change::Insert(Record::Comment(comment.clone()))])?;
        Ok(Some(comment))
    }

    pub fn delete_comment(&mut self, id: EntityId) -> StoreResult<bool> {
        self.delete_leaf("delete_comment", EntityKind::Comment, id)
    }

    pub fn get_task_comments(&self, task_id: EntityId) -> Vec<Comment> {
        self.data
            .comments
            .iter()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect()
    }

    // Notes.

    pub fn add_note(
        &mut self,
        project_id: EntityId,
        title: &str,
        content: &str,
    ) -> StoreResult<Option<Note>> {
        const OP: &str = "add_note";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let title = title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }
        if self.project(project_id).is_none() {
            skip(OP, "unknown_project");
            return Ok(None);
        }

        let note = Note::new(project_id, title, content);
        self.commit(OP, vec![Change::Insert(Record::Note(note.clone()))])?;
        Ok(Some(note))
    }

    /// Replaces title and content of an existing note.
    pub fn update_note(&mut self, note: &Note) -> StoreResult<Option<Note>> {
        const OP: &str = "update_note";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.note(note.id) else {
            skip(OP, "unknown_note");
            return Ok(None);
        };
        let title = note.title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }

        let updated = Note {
            id: existing.id,
            project_id: existing.project_id,
            title: title.to_string(),
            content: note.content.clone(),
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };
        self.commit(OP, vec![Change::Update(Record::Note(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Deletes a note and its check items. Idempotent.
    pub fn delete_note(&mut self, id: EntityId) -> StoreResult<bool> {
        const OP: &str = "delete_note";
        if !self.ensure_ready(OP) {
            return Ok(false);
        }
        let plan = plan_note_delete(&self.data, id);
        if plan.is_empty() {
            return Ok(false);
        }
        self.commit(OP, plan)?;
        Ok(true)
    }

    pub fn get_project_notes(&self, project_id: EntityId) -> Vec<Note> {
        self.data
            .notes
            .iter()
            .filter(|note| note.project_id == project_id)
            .cloned()
            .collect()
    }

    // Check items.

    pub fn add_check_item(
        &mut self,
        note_id: EntityId,
        content: &str,
    ) -> StoreResult<Option<CheckItem>> {
        const OP: &str = "add_check_item";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let content = content.trim();
        if content.is_empty() {
            skip(OP, "empty_content");
            return Ok(None);
        }
        if self.note(note_id).is_none() {
            skip(OP, "unknown_note");
            return Ok(None);
        }

        let item = CheckItem::new(note_id, content);
        self.commit(OP, vec![Change::Insert(Record::CheckItem(item.clone()))])?;
        Ok(Some(item))
    }

    /// Flips `checked`; calling it twice restores the original value.
    pub fn toggle_check_item(&mut self, id: EntityId) -> StoreResult<Option<CheckItem>> {
        const OP: &str = "toggle_check_item";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.data.check_items.iter().find(|item| item.id == id) else {
            skip(OP, "unknown_check_item");
            return Ok(None);
        };

        let mut updated = existing.clone();
        updated.checked = !updated.checked;
        self.commit(OP, vec![Change::Update(Record::CheckItem(updated.clone()))])?;
        Ok(Some(updated))
    }

    pub fn delete_check_item(&mut self, id: EntityId) -> StoreResult<bool> {
        self.delete_leaf("delete_check_item", EntityKind::CheckItem, id)
    }

    pub fn get_note_check_items(&self, note_id: EntityId) -> Vec<CheckItem> {
        self.data
            .check_items
            .iter()
            .filter(|item| item.note_id == note_id)
            .cloned()
            .collect()
    }

    // Calendar events.

    /// Creates an event. A reversed time range is accepted and logged.
    pub fn add_event(&mut self, request: NewEvent) -> StoreResult<Option<CalendarEvent>> {
        const OP: &str = "add_event";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let title = request.title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }
        if self.project(request.project_id).is_none() {
            skip(OP, "unknown_project");
            return Ok(None);
        }

        let mut event = CalendarEvent::new(request.project_id, title, request.start, request.end);
        event.description = request.description;
        if event.is_reversed() {
            warn!("event=store_mutation module=store status=warn op={OP} reason=end_before_start");
        }
        self.commit(OP, vec![Change::Insert(Record::Event(event.clone()))])?;
        Ok(Some(event))
    }

    /// Replaces title, description and time range of an existing event.
    pub fn update_event(&mut self, event: &CalendarEvent) -> StoreResult<Option<CalendarEvent>> {
        const OP: &str = "update_event";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let Some(existing) = self.data.events.iter().find(|current| current.id == event.id) else {
            skip(OP, "unknown_event");
            return Ok(None);
        };
        let title = event.title.trim();
        if title.is_empty() {
            skip(OP, "empty_title");
            return Ok(None);
        }

        let updated = CalendarEvent {
            id: existing.id,
            project_id: existing.project_id,
            created_at: existing.created_at,
            title: title.to_string(),
            ..event.clone()
        };
        if updated.is_reversed() {
            warn!("event=store_mutation module=store status=warn op={OP} reason=end_before_start");
        }
        self.commit(OP, vec![Change::Update(Record::Event(updated.clone()))])?;
        Ok(Some(updated))
    }

    pub fn delete_event(&mut self, id: EntityId) -> StoreResult<bool> {
        self.delete_leaf("delete_event", EntityKind::Event, id)
    }

    pub fn get_project_events(&self, project_id: EntityId) -> Vec<CalendarEvent> {
        self.data
            .events
            .iter()
            .filter(|event| event.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Events of a project starting on `date` (UTC calendar day).
    pub fn get_project_events_on(&self, project_id: EntityId, date: NaiveDate) -> Vec<CalendarEvent> {
        events_on(&self.get_project_events(project_id), date)
    }

    // Board columns.

    /// Appends a column after the project's current last column.
    pub fn add_board_column(
        &mut self,
        project_id: EntityId,
        name: &str,
    ) -> StoreResult<Option<BoardColumn>> {
        const OP: &str = "add_board_column";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            skip(OP, "empty_name");
            return Ok(None);
        }
        if self.project(project_id).is_none() {
            skip(OP, "unknown_project");
            return Ok(None);
        }

        let last = self
            .data
            .board_columns
            .iter()
            .filter(|column| column.project_id == project_id)
            .map(|column| column.position)
            .max();
        let position = match last {
            None => 0,
            Some(last) => match last.checked_add(1) {
                Some(position) => position,
                None => {
                    skip(OP, "position_overflow");
                    return Ok(None);
                }
            },
        };
        let column = BoardColumn::new(project_id, name, position);
        self.commit(OP, vec![Change::Insert(Record::BoardColumn(column.clone()))])?;
        Ok(Some(column))
    }

    /// Renames a column.
    pub fn update_board_column(
        &mut self,
        id: EntityId,
        name: &str,
    ) -> StoreResult<Option<BoardColumn>> {
        const OP: &str = "update_board_column";
        if !self.ensure_ready(OP) {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            skip(OP, "empty_name");
            return Ok(None);
        }
        let Some(existing) = self.board_column(id) else {
            skip(OP, "unknown_column");
            return Ok(None);
        };

        let mut updated = existing.clone();
        updated.name = name.to_string();
        self.commit(OP, vec![Change::Update(Record::BoardColumn(updated.clone()))])?;
        Ok(Some(updated))
    }

    /// Deletes a column, handing its tasks to the lowest-position sibling
    /// (or clearing their column when none remains). Idempotent.
    pub fn delete_board_column(&mut self, id: EntityId) -> StoreResult<bool> {
        const OP: &str = "delete_board_column";
        if !self.ensure_ready(OP) {
            return Ok(false);
        }
        let plan = plan_column_delete(&self.data, id, Utc::now());
        if plan.is_empty() {
            return Ok(false);
        }
        self.commit(OP, plan)?;
        Ok(true)
    }

    /// Columns of a project sorted by position (ties in insertion order).
    pub fn get_project_board_columns(&self, project_id: EntityId) -> Vec<BoardColumn> {
        let mut columns: Vec<BoardColumn> = self
            .data
            .board_columns
            .iter()
            .filter(|column| column.project_id == project_id)
            .cloned()
            .collect();
        sort_by_position(&mut columns);
        columns
    }

    // Internals.

    fn ensure_ready(&self, op: &str) -> bool {
        if self.state == StoreState::Loading {
            warn!("event=store_mutation module=store status=skip op={op} reason=loading");
            return false;
        }
        true
    }

    fn commit(&mut self, op: &str, changes: Vec<Change>) -> StoreResult<()> {
        let started_at = Instant::now();
        if let Err(err) = self.backend.commit(&changes) {
            error!(
                "event=store_mutation module=store status=error op={op} backend={} changes={} error={err}",
                self.backend.name(),
                changes.len()
            );
            return Err(err.into());
        }

        for change in &changes {
            self.data.apply(change);
        }
        debug!(
            "event=store_mutation module=store status=ok op={op} changes={} duration_ms={}",
            changes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn delete_leaf(&mut self, op: &str, kind: EntityKind, id: EntityId) -> StoreResult<bool> {
        if !self.ensure_ready(op) {
            return Ok(false);
        }
        if !self.data.contains(kind, id) {
            return Ok(false);
        }
        self.commit(op, vec![Change::Delete { kind, id }])?;
        Ok(true)
    }

    fn column_in_project(&self, column_id: EntityId, project_id: EntityId) -> bool {
        self.board_column(column_id)
            .is_some_and(|column| column.project_id == project_id)
    }

    fn first_column(&self, project_id: EntityId) -> Option<EntityId> {
        self.data
            .board_columns
            .iter()
            .filter(|column| column.project_id == project_id)
            .min_by_key(|column| column.position)
            .map(|column| column.id)
    }

    /// Position after the last task of the lane; `None` when it would overflow.
    fn next_task_position(&self, project_id: EntityId, column_id: Option<EntityId>) -> Option<i32> {
        let last = self
            .data
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id && task.column_id == column_id)
            .map(|task| task.position)
            .max();
        match last {
            Some(last) => last.checked_add(1),
            None => Some(0),
        }
    }
}

fn skip(op: &str, reason: &str) {
    debug!("event=store_mutation module=store status=skip op={op} reason={reason}");
}
