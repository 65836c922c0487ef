//! Task domain model
//!
//! Tasks are immutable value records. A status change produces a new task
//! through [`Task::apply`]; nothing holds a live reference to another task.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date::parse_instant;
use super::id::TaskId;
use super::validate::ValidationError;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Returns the wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }

    /// Returns a display label for board columns
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Done => "Done",
        }
    }

    /// Applies an action to this status
    ///
    /// `done` absorbs every action. From any other status the result depends
    /// only on the action.
    pub fn next(self, action: Action) -> TaskStatus {
        if self.is_complete() {
            return TaskStatus::Done;
        }
        match action {
            Action::Start => TaskStatus::InProgress,
            Action::Block => TaskStatus::Blocked,
            Action::Unblock => TaskStatus::Todo,
            Action::Finish => TaskStatus::Done,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" => Ok(TaskStatus::Done),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// Action driving the status automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Block,
    Unblock,
    Finish,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Start, Action::Block, Action::Unblock, Action::Finish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Block => "block",
            Action::Unblock => "unblock",
            Action::Finish => "finish",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(Action::Start),
            "block" => Ok(Action::Block),
            "unblock" => Ok(Action::Unblock),
            "finish" => Ok(Action::Finish),
            other => Err(ValidationError::UnknownAction(other.to_string())),
        }
    }
}

/// Returns the status reached from `current` by `action`
pub fn next_status(current: TaskStatus, action: Action) -> TaskStatus {
    current.next(action)
}

/// A unit of work on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier within a collection
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Effort estimate, conventionally 1-13
    pub points: i64,

    /// Due date (`YYYY-MM-DD` or a timestamp), kept as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Free-text tags, matched case-insensitively
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// IDs of tasks this one waits on. Only emptiness matters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<TaskId>,
}

impl Task {
    /// Creates a todo task with zero points and no due date
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            points: 0,
            due: None,
            status: TaskStatus::Todo,
            labels: Vec::new(),
            blocked_by: Vec::new(),
        }
    }

    /// Creates a task whose ID is derived from its title
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self::new(TaskId::from_title(&title), title)
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    pub fn with_due(mut self, due: impl Into<String>) -> Self {
        self.due = Some(due.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_blocker(mut self, id: impl Into<TaskId>) -> Self {
        self.blocked_by.push(id.into());
        self
    }

    /// Returns a copy of this task with the action applied to its status
    pub fn apply(&self, action: Action) -> Task {
        Task {
            status: self.status.next(action),
            ..self.clone()
        }
    }

    /// Returns true if the task carries the label, ignoring case
    pub fn has_label(&self, label: &str) -> bool {
        let wanted = label.to_lowercase();
        self.labels.iter().any(|l| l.to_lowercase() == wanted)
    }

    /// Returns true if the task waits on others or is explicitly blocked
    pub fn is_blocked(&self) -> bool {
        !self.blocked_by.is_empty() || self.status == TaskStatus::Blocked
    }

    /// Returns the parsed due instant, if set and parsable
    pub fn due_instant(&self) -> Option<DateTime<Utc>> {
        self.due.as_deref().and_then(parse_instant)
    }

    /// Returns true if the task is not done and its due date is before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_complete() && self.due_instant().is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_task_has_todo_status() {
        let task = Task::new(TaskId::new("A"), "Alpha");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.points, 0);
        assert!(task.due.is_none());
    }

    #[test]
    fn titled_derives_id() {
        let task = Task::titled("Login Bug");
        assert_eq!(task.id.as_str(), "t_50754");
    }

    #[test]
    fn transition_table() {
        use Action::*;
        use TaskStatus::*;

        let table = [
            (Todo, [InProgress, Blocked, Todo, Done]),
            (InProgress, [InProgress, Blocked, Todo, Done]),
            (Blocked, [InProgress, Blocked, Todo, Done]),
            (Done, [Done, Done, Done, Done]),
        ];

        for (current, expected) in table {
            for (action, want) in [Start, Block, Unblock, Finish].into_iter().zip(expected) {
                assert_eq!(next_status(current, action), want, "{current} --{action}-->");
            }
        }
    }

    #[test]
    fn done_is_absorbing() {
        for action in Action::ALL {
            assert_eq!(next_status(TaskStatus::Done, action), TaskStatus::Done);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = "explode".parse::<Action>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownAction("explode".to_string()));
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!(matches!(
            "invalid".parse::<TaskStatus>(),
            Err(ValidationError::InvalidStatus(_))
        ));
    }

    #[test]
    fn apply_returns_new_record() {
        let task = Task::new(TaskId::new("A"), "Alpha");
        let started = task.apply(Action::Start);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(started.status, TaskStatus::InProgress);
        assert_eq!(started.id, task.id);
    }

    #[test]
    fn label_matching_ignores_case() {
        let task = Task::new(TaskId::new("A"), "Alpha").with_label("URGENT");
        assert!(task.has_label("urgent"));
        assert!(!task.has_label("bug"));
    }

    #[test]
    fn blocked_by_status_or_dependency() {
        let plain = Task::new(TaskId::new("A"), "Alpha");
        assert!(!plain.is_blocked());
        assert!(plain.clone().with_status(TaskStatus::Blocked).is_blocked());
        assert!(plain.with_blocker("x").is_blocked());
    }

    #[test]
    fn overdue_ignores_done_tasks() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let task = Task::new(TaskId::new("A"), "Alpha").with_due("2025-01-01");
        assert!(task.is_overdue(now));
        assert!(!task.clone().with_status(TaskStatus::Done).is_overdue(now));
        assert!(!task.with_due("2025-01-02").is_overdue(now));
    }

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{"id":"A","title":"Fix bug","points":3,"status":"in_progress","labels":["bug"],"due":null,"blockedBy":["B"]}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.due.is_none());
        assert_eq!(task.blocked_by, vec![TaskId::new("B")]);
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{"id":"A","title":"Fix bug","points":3,"status":"todo"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.labels.is_empty());
        assert!(task.blocked_by.is_empty());
    }

    #[test]
    fn rejects_unknown_status_on_the_wire() {
        let json = r#"{"id":"A","title":"Fix bug","points":3,"status":"archived"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let task = Task::new(TaskId::new("A"), "Alpha").with_blocker("B");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["blockedBy"], serde_json::json!(["B"]));
        assert!(json.get("due").is_none());
    }
}
