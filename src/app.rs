// UI-flow controller: store mutation, view sync and notices in one place

use crate::error::TodoError;
use crate::filter::Filter;
use crate::models::{NewTask, StatusSummary, Task, TaskId};
use crate::notice::Notice;
use crate::source::TaskSource;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::view::{TaskStatus, TaskView, TaskViews};
use tracing::{info, warn};

/// Drives the store the way the UI does
///
/// Every mutating handler runs the store operation, resyncs the views and
/// returns the notice the UI should surface. Failures become error notices;
/// none of them stop the app.
pub struct App<S: Storage> {
    store: TaskStore<S>,
    views: TaskViews,
}

impl<S: Storage> App<S> {
    /// Wrap a store and build its initial views
    pub fn new(store: TaskStore<S>) -> Self {
        let mut app = Self {
            store,
            views: TaskViews::new(),
        };
        app.sync();
        app
    }

    /// Get the underlying store
    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Get the views built by the last sync
    pub fn views(&self) -> &TaskViews {
        &self.views
    }

    fn sync(&mut self) {
        self.views.sync(self.store.get_tasks());
    }

    /// Seed an empty store from `source`; a populated store is left alone
    pub fn initialize(&mut self, source: &dyn TaskSource) -> Vec<Notice> {
        if !self.store.is_empty() {
            return Vec::new();
        }

        let records = match source.fetch() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Seed fetch failed, starting empty");
                return vec![Notice::from(e)];
            }
        };

        let notices: Vec<Notice> = match self.store.seed(&records) {
            Ok(rejected) => rejected.iter().map(|(_, e)| Notice::from(e)).collect(),
            Err(e) => vec![Notice::from(e)],
        };
        self.sync();
        info!(count = self.store.len(), "Initialized tasks");
        notices
    }

    pub fn add(&mut self, name: &str, options: NewTask) -> Notice {
        let name = name.trim();
        if name.is_empty() {
            return Notice::error("Task name cannot be empty");
        }

        match self.store.add_task(name, options) {
            Ok(_) => {
                self.sync();
                Notice::success("Task added!")
            }
            Err(e) => Notice::from(e),
        }
    }

    pub fn toggle(&mut self, id: TaskId) -> Notice {
        match self.store.toggle_task(id) {
            Ok(Some(task)) => {
                self.sync();
                if task.completed {
                    Notice::success("Task marked as completed!")
                } else {
                    Notice::info("Task marked as pending!")
                }
            }
            Ok(None) => Notice::from(TodoError::NotFound(id)),
            Err(e) => Notice::from(e),
        }
    }

    pub fn edit(&mut self, id: TaskId, new_name: &str) -> Notice {
        match self.store.edit_task(id, new_name.trim()) {
            Ok(Some(_)) => {
                self.sync();
                Notice::success("Task updated!")
            }
            Ok(None) => Notice::from(TodoError::NotFound(id)),
            Err(e) => Notice::from(e),
        }
    }

    pub fn delete(&mut self, id: TaskId) -> Notice {
        match self.store.delete_task(id) {
            Ok(Some(_)) => {
                self.sync();
                Notice::warning("Task deleted!")
            }
            Ok(None) => Notice::from(TodoError::NotFound(id)),
            Err(e) => Notice::from(e),
        }
    }

    /// Tasks matching `term`; a blank term lists everything
    pub fn search(&self, term: &str) -> Result<Vec<&Task>, Notice> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(self.store.get_tasks().iter().collect());
        }
        self.store.search_tasks(term).map_err(Notice::from)
    }

    pub fn filter(&self, filter: &Filter) -> Vec<&Task> {
        self.store.filter_tasks(filter)
    }

    pub fn summary(&self) -> StatusSummary {
        self.store.summary()
    }

    /// Log the view line for a task
    pub fn log_info(&self, id: TaskId) -> Option<&TaskView> {
        let view = self.views.get(id)?;
        view.display_info();
        Some(view)
    }
}
