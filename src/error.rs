use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{DependencyId, TaskId};

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Reasons the task store refuses a write. The canonical snapshot is left
/// untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Dependency not found: {0}")]
    UnknownDependency(DependencyId),

    #[error("Task {task}: end date {end} is before start date {start}")]
    InvertedRange {
        task: TaskId,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Task {task}: '{value}' is not a valid date")]
    InvalidDate { task: TaskId, value: String },

    #[error("Dependency {predecessor} -> {successor} already exists")]
    DuplicateDependency {
        predecessor: TaskId,
        successor: TaskId,
    },

    #[error("Task {0} cannot depend on itself")]
    SelfLink(TaskId),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
