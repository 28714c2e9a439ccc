// Query filtering for tasks

use crate::models::{Priority, Task};
use std::fmt;
use std::str::FromStr;

/// Completion-status filter used by the list view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "pending" => Ok(StatusFilter::Pending),
            other => Err(format!("Unknown status: {} (expected all, completed or pending)", other)),
        }
    }
}

/// Filter for listing tasks; every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    /// Exact, case-insensitive category match
    pub category: Option<String>,
}

impl Filter {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if let Some(category) = &self.category {
            return task.category.eq_ignore_ascii_case(category);
        }
        true
    }
}

impl From<StatusFilter> for Filter {
    fn from(status: StatusFilter) -> Self {
        Filter::status(status)
    }
}
