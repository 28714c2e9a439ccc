// Seed sources used to populate an empty store at startup

use crate::error::{Result, TodoError};
use crate::models::RemoteTask;
use std::time::Duration;
use tracing::{debug, warn};

/// Best-effort provider of starter tasks
pub trait TaskSource {
    fn fetch(&self) -> Result<Vec<RemoteTask>>;
}

/// Whether the mock source should fail its fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    #[default]
    Never,
    Always,
}

/// Fixed three-task source standing in for a remote API
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    failure: FailureMode,
    latency: Duration,
}

impl MockSource {
    /// Source that always answers with the fixed records
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose fetch always fails
    pub fn failing() -> Self {
        Self::new().with_failure(FailureMode::Always)
    }

    /// Set whether the fetch fails
    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    /// Block for `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn records() -> Vec<RemoteTask> {
        vec![
            RemoteTask {
                id: 1,
                name: "Learn JavaScript".to_string(),
                completed: false,
            },
            RemoteTask {
                id: 2,
                name: "Build Task Manager".to_string(),
                completed: true,
            },
            RemoteTask {
                id: 3,
                name: "Add More Features Daily".to_string(),
                completed: false,
            },
        ]
    }
}

impl TaskSource for MockSource {
    fn fetch(&self) -> Result<Vec<RemoteTask>> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        match self.failure {
            FailureMode::Never => {
                let records = Self::records();
                debug!(count = records.len(), "Fetched seed tasks");
                Ok(records)
            }
            FailureMode::Always => {
                warn!("Seed source unavailable");
                Err(TodoError::SourceUnavailable)
            }
        }
    }
}

/// Source that yields a caller-supplied list
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<RemoteTask>);

impl TaskSource for StaticSource {
    fn fetch(&self) -> Result<Vec<RemoteTask>> {
        Ok(self.0.clone())
    }
}
