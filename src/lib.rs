// todolist - Local to-do list store with write-through persistence

pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod notice;
pub mod source;
pub mod storage;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use app::App;
pub use config::{Backend, Config};
pub use error::{StorageError, TodoError};
pub use filter::{Filter, StatusFilter};
pub use models::{NewTask, Priority, RemoteTask, StatusSummary, Task, TaskId, now_ms};
pub use notice::{Notice, NoticeKind};
pub use source::{FailureMode, MockSource, StaticSource, TaskSource};
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use store::TaskStore;
pub use view::{TaskStatus, TaskView, TaskViews};
