//! Shared formatting helpers for the board

use crate::domain::Task;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated)
    }
}

/// Second card line: points, due date and priority
pub fn card_meta(task: &Task, priority: u8, overdue: bool) -> String {
    let due = match (&task.due, overdue) {
        (Some(due), true) => format!("due {} !", due),
        (Some(due), false) => format!("due {}", due),
        (None, _) => "no due".to_string(),
    };
    format!("{}pt | {} | P{}", task.points, due, priority)
}

/// Third card line: labels as tags, empty when there are none
pub fn card_labels(task: &Task) -> String {
    task.labels
        .iter()
        .map(|l| format!("#{}", l))
        .collect::<Vec<_>>()
        .join(" ")
}
