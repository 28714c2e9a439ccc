// Task store: the ordered task collection with write-through persistence

use crate::error::{MIN_NAME_LEN, Result, TodoError};
use crate::filter::Filter;
use crate::models::{NewTask, RemoteTask, StatusSummary, Task, TaskId, now_ms};
use crate::storage::Storage;
use regex::RegexBuilder;
use tracing::{debug, info, warn};

/// Default storage slot holding the serialized task array
pub const DEFAULT_SLOT: &str = "tasks";

/// Owner of the live task collection and its persisted form
///
/// Every mutation replaces the affected record and then writes the whole
/// collection to a single storage slot.
pub struct TaskStore<S: Storage> {
    storage: S,
    slot: String,
    tasks: Vec<Task>,
}

impl<S: Storage> TaskStore<S> {
    /// Open a store on the default slot
    pub fn open(storage: S) -> Result<Self> {
        Self::open_slot(storage, DEFAULT_SLOT)
    }

    /// Open a store, loading whatever the slot holds (empty if never written)
    pub fn open_slot(storage: S, slot: &str) -> Result<Self> {
        let tasks = match storage.load(slot)? {
            Some(data) => serde_json::from_str(&data).map_err(crate::error::StorageError::from)?,
            None => Vec::new(),
        };

        let store = Self {
            storage,
            slot: slot.to_string(),
            tasks,
        };
        info!(slot, count = store.tasks.len(), "Loaded tasks");
        Ok(store)
    }

    /// Get the storage slot this store writes to
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Get the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the storage backend back, e.g. to reopen it
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current collection in insertion order
    pub fn get_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id
    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Case-insensitive regular expression match against task names
    ///
    /// Patterns use the `regex` crate syntax, which has no lookaround or
    /// backreferences; such patterns fail with `InvalidPattern`.
    pub fn search_tasks(&self, pattern: &str) -> Result<Vec<&Task>> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| TodoError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(self.tasks.iter().filter(|task| regex.is_match(&task.name)).collect())
    }

    /// Tasks matching every criterion of `filter`, in order
    pub fn filter_tasks(&self, filter: &Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    /// Completed and pending counts
    pub fn summary(&self) -> StatusSummary {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        StatusSummary {
            completed,
            pending: self.tasks.len() - completed,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new pending task and return its id
    pub fn add_task(&mut self, name: &str, options: NewTask) -> Result<TaskId> {
        Self::validate_name(name)?;

        let id = match options.id {
            Some(id) if self.get_task(id).is_some() => return Err(TodoError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id(),
        };

        self.tasks.push(Task {
            id,
            name: name.to_string(),
            completed: false,
            priority: options.priority.unwrap_or_default(),
            due_date: options.due_date.unwrap_or_default(),
            category: options.category.unwrap_or_default(),
        });
        if let Err(e) = self.persist() {
            self.tasks.pop();
            return Err(e);
        }

        debug!(id, name, "Added task");
        Ok(id)
    }

    /// Flip `completed`; `None` if no task has this id
    pub fn toggle_task(&mut self, id: TaskId) -> Result<Option<Task>> {
        self.replace(id, |task| Task {
            completed: !task.completed,
            ..task.clone()
        })
    }

    /// Rename a task; `None` if no task has this id
    pub fn edit_task(&mut self, id: TaskId, new_name: &str) -> Result<Option<Task>> {
        Self::validate_name(new_name)?;
        self.replace(id, |task| Task {
            name: new_name.to_string(),
            ..task.clone()
        })
    }

    /// Remove a task and return it; `None` if no task has this id
    pub fn delete_task(&mut self, id: TaskId) -> Result<Option<Task>> {
        let Some(index) = self.position(id) else {
            debug!(id, "delete_task: no such task");
            return Ok(None);
        };

        let removed = self.tasks.remove(index);
        if let Err(e) = self.persist() {
            self.tasks.insert(index, removed);
            return Err(e);
        }

        debug!(id, "Deleted task");
        Ok(Some(removed))
    }

    /// Insert records from a seed source in one write
    ///
    /// Records keep their `completed` flag. Records that fail validation or
    /// reuse a live id are skipped and returned alongside their error.
    pub fn seed(&mut self, records: &[RemoteTask]) -> Result<Vec<(TaskId, TodoError)>> {
        let original_len = self.tasks.len();
        let mut rejected = Vec::new();
        let mut added = 0;

        for record in records {
            if let Err(e) = Self::validate_name(&record.name) {
                warn!(id = record.id, name = %record.name, "Skipping seed record with invalid name");
                rejected.push((record.id, e));
                continue;
            }
            if self.get_task(record.id).is_some() {
                warn!(id = record.id, "Skipping seed record with duplicate id");
                rejected.push((record.id, TodoError::DuplicateId(record.id)));
                continue;
            }

            self.tasks.push(Task {
                id: record.id,
                name: record.name.clone(),
                completed: record.completed,
                priority: Default::default(),
                due_date: String::new(),
                category: String::new(),
            });
            added += 1;
        }

        if added > 0 {
            if let Err(e) = self.persist() {
                self.tasks.truncate(original_len);
                return Err(e);
            }
        }
        info!(added, rejected = rejected.len(), "Seeded tasks");
        Ok(rejected)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Swap in a new version of a task, then persist
    fn replace(&mut self, id: TaskId, update: impl FnOnce(&Task) -> Task) -> Result<Option<Task>> {
        let Some(index) = self.position(id) else {
            debug!(id, "No such task, nothing to update");
            return Ok(None);
        };

        let updated = update(&self.tasks[index]);
        let previous = std::mem::replace(&mut self.tasks[index], updated.clone());
        if let Err(e) = self.persist() {
            self.tasks[index] = previous;
            return Err(e);
        }

        debug!(id, completed = updated.completed, name = %updated.name, "Updated task");
        Ok(Some(updated))
    }

    /// Wall-clock id, bumped past every live id so it stays unique
    fn next_id(&self) -> TaskId {
        let max_id = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        now_ms().max(max_id.saturating_add(1))
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.chars().count() < MIN_NAME_LEN {
            return Err(TodoError::Validation);
        }
        Ok(())
    }

    /// Write the whole collection to the slot
    fn persist(&mut self) -> Result<()> {
        let data = serde_json::to_string(&self.tasks).map_err(crate::error::StorageError::from)?;
        self.storage.save(&self.slot, &data)?;
        debug!(slot = %self.slot, count = self.tasks.len(), "Persisted tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusFilter;
    use crate::models::Priority;
    use crate::storage::{FileStorage, MemoryStorage, SqliteStorage};
    use tempfile::TempDir;

    /// Storage whose writes can be switched off
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: bool,
    }

    impl Storage for FlakyStorage {
        fn load(&self, slot: &str) -> std::result::Result<Option<String>, crate::error::StorageError> {
            self.inner.load(slot)
        }

        fn save(&mut self, slot: &str, data: &str) -> std::result::Result<(), crate::error::StorageError> {
            if self.fail_writes {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.save(slot, data)
        }
    }

    fn empty_store() -> TaskStore<MemoryStorage> {
        TaskStore::open(MemoryStorage::new()).unwrap()
    }

    fn store_with(names: &[&str]) -> TaskStore<MemoryStorage> {
        let mut store = empty_store();
        for (i, name) in names.iter().enumerate() {
            store.add_task(name, NewTask::default().with_id(i as TaskId + 1)).unwrap();
        }
        store
    }

    fn names<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
        tasks.iter().map(|task| task.name.as_str()).collect()
    }

    #[test]
    fn test_open_empty_slot() {
        let store = empty_store();
        assert!(store.is_empty());
        assert_eq!(store.slot(), DEFAULT_SLOT);
    }

    #[test]
    fn test_add_task_defaults() {
        let mut store = empty_store();
        let id = store.add_task("Write spec", NewTask::default()).unwrap();

        let task = store.get_task(id).unwrap();
        assert_eq!(task.name, "Write spec");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.due_date.is_empty());
        assert!(task.category.is_empty());
        assert!(id > 1_600_000_000_000);
    }

    #[test]
    fn test_add_task_with_options() {
        let mut store = empty_store();
        let options = NewTask::default()
            .with_id(42)
            .with_priority(Priority::High)
            .with_due_date("2024-05-01")
            .with_category("work");
        let id = store.add_task("Ship release", options).unwrap();

        assert_eq!(id, 42);
        let task = store.get_task(42).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, "2024-05-01");
        assert_eq!(task.category, "work");
    }

    #[test]
    fn test_add_task_length_boundary() {
        let mut store = empty_store();
        for name in ["abc", "abcd", "three words here", "日本語"] {
            let before = store.len();
            store.add_task(name, NewTask::default()).unwrap();
            assert_eq!(store.len(), before + 1);
        }

        for name in ["", "a", "ab", "日本"] {
            let before = store.get_tasks().to_vec();
            let err = store.add_task(name, NewTask::default()).unwrap_err();
            assert!(matches!(err, TodoError::Validation));
            assert_eq!(store.get_tasks(), before.as_slice());
        }
    }

    #[test]
    fn test_add_task_short_name_on_empty_store() {
        let mut store = empty_store();
        assert!(matches!(store.add_task("ab", NewTask::default()), Err(TodoError::Validation)));
        assert!(store.is_empty());
        assert!(store.storage().load(DEFAULT_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_add_task_duplicate_id() {
        let mut store = store_with(&["First task"]);
        let err = store.add_task("Second task", NewTask::default().with_id(1)).unwrap_err();
        assert!(matches!(err, TodoError::DuplicateId(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_generated_ids_are_unique_and_ordered() {
        let mut store = empty_store();
        let ids: Vec<TaskId> = (0..50)
            .map(|i| store.add_task(&format!("Task {}", i), NewTask::default()).unwrap())
            .collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        let stored: Vec<TaskId> = store.get_tasks().iter().map(|task| task.id).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = store_with(&["Feed the cat"]);

        let toggled = store.toggle_task(1).unwrap().unwrap();
        assert!(toggled.completed);
        assert!(store.get_task(1).unwrap().completed);

        let toggled = store.toggle_task(1).unwrap().unwrap();
        assert!(!toggled.completed);
        assert!(!store.get_task(1).unwrap().completed);
    }

    #[test]
    fn test_toggle_missing_is_noop() {
        let mut store = store_with(&["Feed the cat"]);
        let before = store.get_tasks().to_vec();

        assert!(store.toggle_task(99).unwrap().is_none());
        assert_eq!(store.get_tasks(), before.as_slice());
    }

    #[test]
    fn test_edit_task() {
        let mut store = store_with(&["Feed the cat"]);
        store.toggle_task(1).unwrap();

        let edited = store.edit_task(1, "Feed both cats").unwrap().unwrap();
        assert_eq!(edited.name, "Feed both cats");
        assert!(edited.completed);

        assert!(matches!(store.edit_task(1, "no"), Err(TodoError::Validation)));
        assert_eq!(store.get_task(1).unwrap().name, "Feed both cats");
    }

    #[test]
    fn test_delete_then_toggle_and_edit_are_noops() {
        let mut store = store_with(&["Feed the cat", "Walk the dog"]);

        let removed = store.delete_task(1).unwrap().unwrap();
        assert_eq!(removed.name, "Feed the cat");
        let after_delete = store.get_tasks().to_vec();

        assert!(store.toggle_task(1).unwrap().is_none());
        assert!(store.edit_task(1, "Feed the cat again").unwrap().is_none());
        assert!(store.delete_task(1).unwrap().is_none());
        assert_eq!(store.get_tasks(), after_delete.as_slice());
    }

    #[test]
    fn test_search_subsets_preserve_order() {
        let store = store_with(&["Buy milk", "Write report", "buy bread", "Call mom"]);

        assert!(store.search_tasks("xyz").unwrap().is_empty());
        assert_eq!(names(&store.search_tasks("report").unwrap()), vec!["Write report"]);
        assert_eq!(names(&store.search_tasks("BUY").unwrap()), vec!["Buy milk", "buy bread"]);
        assert_eq!(names(&store.search_tasks("^(buy|call)").unwrap()), vec!["Buy milk", "buy bread", "Call mom"]);
        assert_eq!(store.search_tasks("").unwrap().len(), 4);
        assert_eq!(store.search_tasks(".*").unwrap().len(), 4);
    }

    #[test]
    fn test_search_invalid_pattern() {
        let store = store_with(&["Buy milk"]);
        for pattern in ["(", "[a-", "*milk", "(?=Buy)", r"(b)\1"] {
            let err = store.search_tasks(pattern).unwrap_err();
            assert!(matches!(err, TodoError::InvalidPattern { .. }), "pattern {pattern}");
        }
    }

    #[test]
    fn test_filter_and_summary() {
        let mut store = store_with(&["Buy milk", "Write report", "Call mom"]);
        store.toggle_task(2).unwrap();

        let completed = store.filter_tasks(&StatusFilter::Completed.into());
        assert_eq!(names(&completed), vec!["Write report"]);
        let pending = store.filter_tasks(&StatusFilter::Pending.into());
        assert_eq!(names(&pending), vec!["Buy milk", "Call mom"]);
        assert_eq!(store.filter_tasks(&Filter::default()).len(), 3);

        assert_eq!(store.summary(), StatusSummary { completed: 1, pending: 2 });
    }

    #[test]
    fn test_seed_keeps_completed_and_rejects_bad_records() {
        let mut store = store_with(&["Existing task"]);
        let records = vec![
            RemoteTask { id: 2, name: "Learn JavaScript".to_string(), completed: false },
            RemoteTask { id: 3, name: "Build Task Manager".to_string(), completed: true },
            RemoteTask { id: 4, name: "no".to_string(), completed: false },
            RemoteTask { id: 1, name: "Clashing id".to_string(), completed: false },
        ];

        let rejected = store.seed(&records).unwrap();
        assert_eq!(rejected.len(), 2);
        assert!(matches!(rejected[0], (4, TodoError::Validation)));
        assert!(matches!(rejected[1], (1, TodoError::DuplicateId(1))));

        assert_eq!(store.len(), 3);
        assert!(store.get_task(3).unwrap().completed);
        assert!(!store.get_task(2).unwrap().completed);
    }

    #[test]
    fn test_persist_reload_roundtrip() {
        let temp = TempDir::new().unwrap();
        let expected = {
            let mut store = TaskStore::open(SqliteStorage::open(temp.path()).unwrap()).unwrap();
            store.add_task("Buy milk", NewTask::default().with_id(10)).unwrap();
            store.add_task("Write report", NewTask::default().with_priority(Priority::Low)).unwrap();
            store.add_task("Call mom", NewTask::default().with_id(5)).unwrap();
            store.toggle_task(10).unwrap();
            store.edit_task(5, "Call mom tonight").unwrap();
            store.delete_task(10).unwrap();
            store.toggle_task(5).unwrap();
            store.get_tasks().to_vec()
        };

        let reloaded = TaskStore::open(SqliteStorage::open(temp.path()).unwrap()).unwrap();
        assert_eq!(reloaded.get_tasks(), expected.as_slice());
        assert_eq!(reloaded.get_tasks()[1].name, "Call mom tonight");
    }

    #[test]
    fn test_persist_reload_file_backend() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = TaskStore::open_slot(FileStorage::open(temp.path()).unwrap(), "work").unwrap();
            store.add_task("Draft agenda", NewTask::default().with_id(1)).unwrap();
            store.toggle_task(1).unwrap();
        }

        let reloaded = TaskStore::open_slot(FileStorage::open(temp.path()).unwrap(), "work").unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get_task(1).unwrap().completed);

        let other = TaskStore::open(FileStorage::open(temp.path()).unwrap()).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_write_through_after_each_mutation() {
        let mut store = store_with(&["Buy milk"]);
        store.toggle_task(1).unwrap();

        let persisted = store.storage().load(DEFAULT_SLOT).unwrap().unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&persisted).unwrap();
        assert_eq!(tasks, store.get_tasks());
    }

    #[test]
    fn test_end_to_end_lifecycle() {
        let mut store = empty_store();

        let id = store.add_task("Write spec", NewTask::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_tasks()[0].name, "Write spec");
        assert!(!store.get_tasks()[0].completed);

        store.toggle_task(id).unwrap();
        assert!(store.get_tasks()[0].completed);

        store.edit_task(id, "Write spec v2").unwrap();
        assert_eq!(store.get_tasks()[0].name, "Write spec v2");
        assert!(store.get_tasks()[0].completed);

        store.delete_task(id).unwrap();
        assert!(store.is_empty());

        let reloaded = TaskStore::open(store.into_storage()).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let mut store = TaskStore::open(FlakyStorage::default()).unwrap();
        store.add_task("Buy milk", NewTask::default().with_id(1)).unwrap();
        store.add_task("Call mom", NewTask::default().with_id(2)).unwrap();
        let before = store.get_tasks().to_vec();

        store.storage.fail_writes = true;
        assert!(matches!(store.add_task("Pay rent", NewTask::default()), Err(TodoError::Storage(_))));
        assert!(store.toggle_task(1).is_err());
        assert!(store.edit_task(2, "Call dad").is_err());
        assert!(store.delete_task(1).is_err());
        let seed = [RemoteTask { id: 3, name: "Plan trip".to_string(), completed: false }];
        assert!(store.seed(&seed).is_err());
        assert_eq!(store.get_tasks(), before.as_slice());

        store.storage.fail_writes = false;
        let persisted = store.storage().load(DEFAULT_SLOT).unwrap().unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&persisted).unwrap();
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_corrupt_slot_fails_open() {
        let mut storage = MemoryStorage::new();
        storage.save(DEFAULT_SLOT, "{not json").unwrap();
        assert!(matches!(TaskStore::open(storage), Err(TodoError::Storage(_))));
    }
}
