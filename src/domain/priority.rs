//! Priority scoring
//!
//! Scores a task from 0 to 100. Done tasks always score 0. Everything else
//! starts at [`BASE_SCORE`] and collects independent adjustments:
//!
//! | Signal | Condition | Adjustment |
//! |--------|-----------|------------|
//! | Label | `urgent` | +25 |
//! | Label | `bug` | +15 |
//! | Label | `chore` | -5 |
//! | Due | overdue | +30 |
//! | Due | within 2 days | +20 |
//! | Due | within 7 days | +10 |
//! | Due | none | -3 |
//! | Blocked | `blockedBy` non-empty or status `blocked` | -20 |
//! | Size | `points <= 2` | +8 |
//! | Size | `points <= 5` | +4 |
//! | Size | `points >= 13` | -5 |
//!
//! The sum is clamped to `[0, 100]`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::date::days_until;
use super::task::Task;
use super::validate::{validate_task, ValidationError};

/// Starting score of every open task
pub const BASE_SCORE: i64 = 10;

/// Upper bound of the score
pub const MAX_SCORE: i64 = 100;

/// Individual adjustments that make up a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub base: i64,
    pub labels: i64,
    pub due: i64,
    pub blocked: i64,
    pub size: i64,
    /// Clamped total
    pub score: u8,
}

impl PriorityBreakdown {
    /// Sum of all adjustments before clamping
    pub fn raw(&self) -> i64 {
        self.base + self.labels + self.due + self.blocked + self.size
    }
}

/// Computes the priority of a task relative to `now`
pub fn compute_priority(task: &Task, now: DateTime<Utc>) -> Result<u8, ValidationError> {
    explain_priority(task, now).map(|b| b.score)
}

/// Computes the priority of a task and reports how it was reached
pub fn explain_priority(task: &Task, now: DateTime<Utc>) -> Result<PriorityBreakdown, ValidationError> {
    validate_task(task)?;

    if task.status.is_complete() {
        return Ok(PriorityBreakdown::default());
    }

    let mut breakdown = PriorityBreakdown {
        base: BASE_SCORE,
        labels: label_adjustment(task),
        due: due_adjustment(task, now),
        blocked: if task.is_blocked() { -20 } else { 0 },
        size: size_adjustment(task.points),
        score: 0,
    };
    breakdown.score = breakdown.raw().clamp(0, MAX_SCORE) as u8;

    Ok(breakdown)
}

fn label_adjustment(task: &Task) -> i64 {
    let mut adjustment = 0;
    if task.has_label("urgent") {
        adjustment += 25;
    }
    if task.has_label("bug") {
        adjustment += 15;
    }
    if task.has_label("chore") {
        adjustment -= 5;
    }
    adjustment
}

fn due_adjustment(task: &Task, now: DateTime<Utc>) -> i64 {
    // Validation guarantees a present due date parses
    let Some(due) = task.due_instant() else {
        return -3;
    };

    match days_until(due, now) {
        d if d < 0 => 30,
        d if d <= 2 => 20,
        d if d <= 7 => 10,
        _ => 0,
    }
}

fn size_adjustment(points: i64) -> i64 {
    if points <= 2 {
        8
    } else if points <= 5 {
        4
    } else if points >= 13 {
        -5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskStatus};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap()
    }

    fn task() -> Task {
        Task::new(TaskId::new("X"), "Demo").with_points(3)
    }

    #[test]
    fn done_scores_zero() {
        let done = task()
            .with_status(TaskStatus::Done)
            .with_label("urgent")
            .with_due("2025-08-01");
        assert_eq!(compute_priority(&done, now()), Ok(0));
    }

    #[test]
    fn label_due_and_blocked_branches() {
        let overdue = task()
            .with_label("urgent")
            .with_label("bug")
            .with_due("2025-08-01")
            .with_blocker("a");
        let soon = task().with_due("2025-08-11");
        let later = task().with_due("2025-08-25").with_label("chore").with_points(8);

        // 10 + 25 + 15 + 30 - 20 + 4
        assert_eq!(compute_priority(&overdue, now()), Ok(64));
        // 10 + 20 + 4
        assert_eq!(compute_priority(&soon, now()), Ok(34));
        // 10 - 5 + 0 + 0
        assert_eq!(compute_priority(&later, now()), Ok(5));
    }

    #[test]
    fn due_windows() {
        let at = |due: &str| compute_priority(&task().with_due(due), now()).unwrap();
        // base 10 + size 4
        assert_eq!(at("2025-08-09"), 44);
        assert_eq!(at("2025-08-10"), 34);
        assert_eq!(at("2025-08-12"), 34);
        assert_eq!(at("2025-08-13"), 24);
        assert_eq!(at("2025-08-17"), 24);
        assert_eq!(at("2025-08-18"), 14);
        // no due: 10 - 3 + 4
        assert_eq!(compute_priority(&task(), now()), Ok(11));
    }

    #[test]
    fn size_windows() {
        let at = |points: i64| size_adjustment(points);
        assert_eq!(at(0), 8);
        assert_eq!(at(2), 8);
        assert_eq!(at(3), 4);
        assert_eq!(at(5), 4);
        assert_eq!(at(8), 0);
        assert_eq!(at(12), 0);
        assert_eq!(at(13), -5);
        assert_eq!(at(40), -5);
    }

    #[test]
    fn blocked_penalty_applies_once() {
        let blocked = task()
            .with_status(TaskStatus::Blocked)
            .with_blocker("a")
            .with_blocker("b");
        let breakdown = explain_priority(&blocked, now()).unwrap();
        assert_eq!(breakdown.blocked, -20);
    }

    #[test]
    fn clamps_low() {
        let low = Task::new(TaskId::new("lo"), "X")
            .with_points(13)
            .with_status(TaskStatus::Blocked)
            .with_label("chore")
            .with_blocker("x");
        let breakdown = explain_priority(&low, now()).unwrap();
        assert_eq!(breakdown.raw(), -23);
        assert_eq!(breakdown.score, 0);
    }

    #[test]
    fn high_score_stays_in_range() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let high = Task::new(TaskId::new("hi"), "X")
            .with_status(TaskStatus::InProgress)
            .with_label("urgent")
            .with_label("bug")
            .with_points(1)
            .with_due("2025-01-01");
        // 10 + 25 + 15 + 30 + 8
        assert_eq!(compute_priority(&high, now), Ok(88));
    }

    #[test]
    fn validates_input() {
        assert_eq!(
            compute_priority(&task().with_points(-1), now()),
            Err(ValidationError::InvalidPoints(-1))
        );
        assert!(matches!(
            compute_priority(&task().with_due("invalid-date"), now()),
            Err(ValidationError::InvalidDue(_))
        ));
        let mut nameless = task();
        nameless.title.clear();
        assert_eq!(compute_priority(&nameless, now()), Err(ValidationError::MissingTitle));
    }

    #[test]
    fn small_tasks_outrank_large_blocked_ones() {
        let small = task().with_points(1).with_label("urgent").with_due("2025-08-11");
        let big_blocked = task().with_points(13).with_status(TaskStatus::Blocked);
        assert!(compute_priority(&small, now()).unwrap() > compute_priority(&big_blocked, now()).unwrap());
    }

    fn arb_status() -> impl Strategy<Value = TaskStatus> {
        prop::sample::select(TaskStatus::ALL.to_vec())
    }

    fn arb_label() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["urgent", "URGENT", "bug", "Bug", "chore", "docs", "ui"])
            .prop_map(String::from)
    }

    prop_compose! {
        fn arb_task()(
            points in 0i64..40,
            status in arb_status(),
            labels in prop::collection::vec(arb_label(), 0..4),
            due_offset in prop::option::of(-30i64..30),
            blockers in prop::collection::vec("[a-z]{1,3}", 0..3),
        ) -> Task {
            let mut task = Task::new(TaskId::new("p"), "prop").with_points(points).with_status(status);
            task.labels = labels;
            task.blocked_by = blockers.into_iter().map(TaskId::new).collect();
            task.due = due_offset.map(|d| (now().date_naive() + chrono::Duration::days(d)).to_string());
            task
        }
    }

    proptest! {
        #[test]
        fn score_is_bounded(task in arb_task()) {
            let score = compute_priority(&task, now()).unwrap();
            prop_assert!(score <= 100);
        }

        #[test]
        fn done_always_zero(task in arb_task()) {
            let done = task.with_status(TaskStatus::Done);
            prop_assert_eq!(compute_priority(&done, now()).unwrap(), 0);
        }

        #[test]
        fn breakdown_matches_score(task in arb_task()) {
            let breakdown = explain_priority(&task, now()).unwrap();
            if !task.status.is_complete() {
                prop_assert_eq!(i64::from(breakdown.score), breakdown.raw().clamp(0, 100));
            }
        }
    }
}
