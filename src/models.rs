// Data models for the to-do list

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task identifier (milliseconds since epoch when generated)
pub type TaskId = i64;

/// Date format used for due dates
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A persisted to-do record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub category: String,
}

impl Task {
    /// Parsed due date, if one is set and well-formed
    pub fn due(&self) -> Option<NaiveDate> {
        if self.due_date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.due_date, DUE_DATE_FORMAT).ok()
    }

    /// True when the task is still open on or after its due date
    ///
    /// A due date names the start of that day, so a task due today is
    /// already overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due().is_some_and(|due| due <= today)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {} (expected high, medium or low)", other)),
        }
    }
}

/// Optional attributes for a new task; anything left `None` is defaulted
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl NewTask {
    /// Use an explicit id instead of a generated one
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the priority (default Medium)
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due date (`YYYY-MM-DD`)
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Set the category label
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Record shape delivered by a seed source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
}

/// Completed/pending counts backing the status pie chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub completed: usize,
    pub pending: usize,
}

impl StatusSummary {
    /// Number of tasks counted
    pub fn total(&self) -> usize {
        self.completed + self.pending
    }

    /// Share of completed tasks in percent (0 when empty)
    pub fn completed_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.completed as f64 * 100.0 / total as f64,
        }
    }

    /// Share of pending tasks in percent (0 when empty)
    pub fn pending_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            _ => 100.0 - self.completed_percent(),
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
