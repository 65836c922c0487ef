//! Task and argument validation

use thiserror::Error;

use super::date::parse_instant;
use super::task::Task;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task id missing")]
    MissingId,

    #[error("Task title missing")]
    MissingTitle,

    #[error("Invalid points: {0} (must be >= 0)")]
    InvalidPoints(i64),

    #[error("Invalid due date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDue(String),

    #[error("Invalid status: '{0}' (expected todo, in_progress, blocked or done)")]
    InvalidStatus(String),

    #[error("Unknown action: '{0}' (expected start, block, unblock or finish)")]
    UnknownAction(String),

    #[error("Invalid capacity: {0} (must be >= 0)")]
    InvalidCapacity(i64),

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

/// Checks a task against the model invariants
///
/// Order of checks: id and title, points, due date. Status needs no check,
/// an out-of-range status cannot be represented by [`super::TaskStatus`].
pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    if task.title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if task.points < 0 {
        return Err(ValidationError::InvalidPoints(task.points));
    }
    if let Some(due) = task.due.as_deref() {
        if parse_instant(due).is_none() {
            return Err(ValidationError::InvalidDue(due.to_string()));
        }
    }
    Ok(())
}
