// Per-task display views, rebuilt from the store after every mutation

use crate::models::{Task, TaskId};
use std::fmt;
use tracing::info;

/// Status/query capability shared by task display objects
pub trait TaskStatus {
    /// Flip the local completion flag (never persisted)
    fn toggle_complete(&mut self);

    /// "Completed" or "Pending"
    fn status(&self) -> &'static str;

    /// Emit a one-line description to the log
    fn display_info(&self);
}

/// Snapshot of a stored task's identity and status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            completed: task.completed,
        }
    }
}

impl TaskStatus for TaskView {
    fn toggle_complete(&mut self) {
        self.completed = !self.completed;
    }

    fn status(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }

    fn display_info(&self) {
        info!(id = self.id, "{}", self);
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task: {}, Status: {}", self.name, self.status())
    }
}

/// The set of views attached to the current store contents
#[derive(Debug, Clone, Default)]
pub struct TaskViews {
    views: Vec<TaskView>,
}

impl TaskViews {
    /// Empty set; call `sync` to populate it
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every view and build a fresh one per task, in store order
    pub fn sync(&mut self, tasks: &[Task]) {
        self.views = tasks.iter().map(TaskView::from).collect();
    }

    /// View for a task id
    pub fn get(&self, id: TaskId) -> Option<&TaskView> {
        self.views.iter().find(|view| view.id == id)
    }

    /// Mutable view for a task id; local changes last until the next sync
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskView> {
        self.views.iter_mut().find(|view| view.id == id)
    }

    /// Views in store order
    pub fn iter(&self) -> impl Iterator<Item = &TaskView> {
        self.views.iter()
    }

    /// Number of views
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True when no views are attached
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// True when every view mirrors the matching task field for field
    pub fn is_synced_with(&self, tasks: &[Task]) -> bool {
        self.views.len() == tasks.len()
            && self
                .views
                .iter()
                .zip(tasks)
                .all(|(view, task)| view.id == task.id && view.name == task.name && view.completed == task.completed)
    }
}
