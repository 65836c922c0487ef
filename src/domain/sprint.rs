//! Greedy sprint assignment
//!
//! Orders open tasks by priority and fills a point capacity greedily. This
//! is an approximation: a skipped large task never triggers backtracking,
//! and later smaller tasks still get a chance to fit.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::TaskId;
use super::priority::compute_priority;
use super::task::Task;
use super::validate::ValidationError;

/// Result of a sprint assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintPlan {
    /// Accepted task IDs in acceptance order
    pub selected: Vec<TaskId>,
    /// Open valid task IDs not accepted, in input order
    pub remaining: Vec<TaskId>,
}

impl SprintPlan {
    /// Returns true if the task was selected
    pub fn is_selected(&self, id: &TaskId) -> bool {
        self.selected.contains(id)
    }
}

struct Candidate<'a> {
    task: &'a Task,
    priority: u8,
    due: Option<DateTime<Utc>>,
}

impl Candidate<'_> {
    /// Priority desc, points asc, due asc (missing last), id asc
    fn rank(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.task.points.cmp(&other.task.points))
            .then_with(|| match (self.due, other.due) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.task.id.cmp(&other.task.id))
    }
}

/// Selects tasks for a sprint of the given point capacity
///
/// Invalid and done tasks are skipped without error; only a negative
/// capacity fails. This leniency differs from
/// [`super::progress_summary`], which rejects the whole collection.
pub fn assign_to_sprint(
    tasks: &[Task],
    capacity: i64,
    now: DateTime<Utc>,
) -> Result<SprintPlan, ValidationError> {
    if capacity < 0 {
        return Err(ValidationError::InvalidCapacity(capacity));
    }

    let candidates: Vec<Candidate> = tasks
        .iter()
        .filter_map(|task| {
            if task.status.is_complete() {
                return None;
            }
            match compute_priority(task, now) {
                Ok(priority) => Some(Candidate {
                    task,
                    priority,
                    due: task.due_instant(),
                }),
                Err(e) => {
                    debug!(id = %task.id, error = %e, "Excluding invalid task from sprint");
                    None
                }
            }
        })
        .collect();

    let mut order: Vec<&Candidate> = candidates.iter().collect();
    order.sort_by(|a, b| a.rank(b));

    let mut selected = Vec::new();
    let mut used: i64 = 0;
    for candidate in order {
        // Points are unbounded, so the running total may not fit in i64
        if let Some(total) = used
            .checked_add(candidate.task.points)
            .filter(|total| *total <= capacity)
        {
            used = total;
            selected.push(candidate.task.id.clone());
        }
    }

    let chosen: HashSet<&TaskId> = selected.iter().collect();
    let remaining = candidates
        .iter()
        .map(|c| &c.task.id)
        .filter(|id| !chosen.contains(id))
        .cloned()
        .collect();

    debug!(
        capacity,
        used,
        selected = selected.len(),
        "Sprint assignment complete"
    );

    Ok(SprintPlan { selected, remaining })
}
