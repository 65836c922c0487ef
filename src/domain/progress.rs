//! Progress aggregation over a task collection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};
use super::validate::{validate_task, ValidationError};

/// Counts of a collection by status, plus overdue and completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub todo: usize,
    pub overdue: usize,
    /// 0..=100
    pub completion_pct: u8,
}

/// Summarizes a collection relative to `now`
///
/// Strict: the first invalid task aborts the whole summary. Sprint
/// assignment is lenient about the same input, see
/// [`super::assign_to_sprint`].
pub fn progress_summary(tasks: &[Task], now: DateTime<Utc>) -> Result<Progress, ValidationError> {
    let mut progress = Progress {
        total: tasks.len(),
        ..Progress::default()
    };

    for task in tasks {
        validate_task(task)?;

        match task.status {
            TaskStatus::Done => progress.done += 1,
            TaskStatus::InProgress => progress.in_progress += 1,
            TaskStatus::Blocked => progress.blocked += 1,
            TaskStatus::Todo => progress.todo += 1,
        }

        if task.is_overdue(now) {
            progress.overdue += 1;
        }
    }

    progress.completion_pct = completion_pct(progress.done, progress.total);
    Ok(progress)
}

fn completion_pct(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u8
}
