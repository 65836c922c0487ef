//! Task CLI commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{compute_priority, explain_priority, Action, Task, TaskId, TaskStatus};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task at the top of the board
    ///
    /// Examples:
    ///   taskboard task add "Fix login" --points 3 --label bug
    ///   taskboard task add "Release" --due 2025-09-01 --blocked-by t_50754
    Add {
        /// Task title
        title: String,

        /// Explicit ID (derived from the title when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Effort estimate
        #[arg(long, short, default_value = "3", allow_negative_numbers = true)]
        points: i64,

        /// Due date (YYYY-MM-DD)
        #[arg(long, short)]
        due: Option<String>,

        /// Initial status
        #[arg(long, short, default_value = "todo")]
        status: TaskStatus,

        /// Label (repeatable)
        #[arg(long = "label", short)]
        labels: Vec<String>,

        /// ID of a task this one waits on (repeatable)
        #[arg(long = "blocked-by")]
        blocked_by: Vec<String>,
    },

    /// List tasks in board order
    List {
        /// Only show tasks with this status
        #[arg(long, short)]
        status: Option<TaskStatus>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Move a task to in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Mark a task as blocked
    Block {
        /// Task ID
        id: String,
    },

    /// Move a blocked task back to todo
    Unblock {
        /// Task ID
        id: String,
    },

    /// Mark a task as done
    Finish {
        /// Task ID
        id: String,
    },

    /// Remove a task from the board
    Remove {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output, now: DateTime<Utc>) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            id,
            points,
            due,
            status,
            labels,
            blocked_by,
        } => {
            let id = match id {
                Some(id) => id.parse()?,
                None => TaskId::from_title(&title),
            };
            let task = Task {
                id,
                title,
                points,
                due: due.map(|d| d.trim().to_string()),
                status,
                labels,
                blocked_by: blocked_by.into_iter().map(TaskId::from).collect(),
            };
            add_task(output, task, now)
        }
        TaskCommands::List { status } => list_tasks(output, status, now),
        TaskCommands::Show { id } => show_task(output, &id, now),
        TaskCommands::Start { id } => transition(output, &id, Action::Start),
        TaskCommands::Block { id } => transition(output, &id, Action::Block),
        TaskCommands::Unblock { id } => transition(output, &id, Action::Unblock),
        TaskCommands::Finish { id } => transition(output, &id, Action::Finish),
        TaskCommands::Remove { id } => remove_task(output, &id),
    }
}

fn add_task(output: &Output, task: Task, now: DateTime<Utc>) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.board_store();

    output.verbose_ctx("task", &format!("Adding {} to {}", task.id, store.path().display()));
    let task = store.create(task)?;
    let priority = compute_priority(&task, now)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "status": task.status,
            "priority": priority,
        }));
    } else {
        output.success(&format!(
            "Created task: {} - {} (priority {})",
            task.id, task.title, priority
        ));
    }

    Ok(())
}

fn list_tasks(output: &Output, status: Option<TaskStatus>, now: DateTime<Utc>) -> Result<()> {
    let project = Project::open_current()?;
    let tasks: Vec<Task> = project
        .board_store()
        .read_all()?
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .collect();

    // Stored tasks are validated on load, so scoring cannot fail here
    let priority = |task: &Task| compute_priority(task, now).unwrap_or(0);

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "points": t.points,
                    "due": t.due,
                    "status": t.status,
                    "labels": t.labels,
                    "blockedBy": t.blocked_by,
                    "priority": priority(t),
                    "overdue": t.is_overdue(now),
                })
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        match status {
            Some(s) => println!("No {} tasks", s),
            None => println!("No tasks"),
        }
    } else {
        println!(
            "{:<10} {:<12} {:>6} {:>4} {:<10} TITLE",
            "ID", "STATUS", "POINTS", "PRIO", "DUE"
        );
        println!("{}", "-".repeat(72));

        for task in &tasks {
            let due = task.due.as_deref().unwrap_or("-");
            let marker = if task.is_overdue(now) { " (overdue)" } else { "" };
            println!(
                "{:<10} {:<12} {:>6} {:>4} {:<10} {}{}",
                task.id,
                task.status,
                task.points,
                priority(task),
                due,
                task.title,
                marker
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, id_str: &str, now: DateTime<Utc>) -> Result<()> {
    let project = Project::open_current()?;
    let id: TaskId = id_str.parse()?;
    let task = project.board_store().get(&id)?;
    let breakdown = explain_priority(&task, now)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "priority": breakdown.score,
            "breakdown": breakdown,
            "overdue": task.is_overdue(now),
            "blocked": task.is_blocked(),
        }));
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Status: {}", task.status.label());
        println!("Points: {}", task.points);
        match &task.due {
            Some(due) if task.is_overdue(now) => println!("Due: {} (overdue)", due),
            Some(due) => println!("Due: {}", due),
            None => println!("Due: -"),
        }
        if !task.labels.is_empty() {
            println!("Labels: {}", task.labels.join(", "));
        }

        if !task.blocked_by.is_empty() {
            println!("\nBlocked by:");
            for dep in &task.blocked_by {
                println!("  {}", dep);
            }
        }

        println!("\nPriority: {}", breakdown.score);
        if !task.status.is_complete() {
            println!(
                "  base {:+}, labels {:+}, due {:+}, blocked {:+}, size {:+}",
                breakdown.base, breakdown.labels, breakdown.due, breakdown.blocked, breakdown.size
            );
        }
    }

    Ok(())
}

fn transition(output: &Output, id_str: &str, action: Action) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.board_store();

    let id: TaskId = id_str.parse()?;
    let before = store.get(&id)?.status;
    let task = store.apply(&id, action)?;

    output.verbose_ctx(
        "task",
        &format!("{}: {} --{}--> {}", task.id, before, action, task.status),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "previous": before,
            "status": task.status,
        }));
    } else if before == task.status {
        output.success(&format!("Task {} stays {}", task.id, task.status));
    } else {
        output.success(&format!("Task {}: {} -> {}", task.id, before, task.status));
    }

    Ok(())
}

fn remove_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: TaskId = id_str.parse()?;

    if !project.board_store().remove(&id)? {
        anyhow::bail!("Task not found: {}", id);
    }

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "removed": true }));
    } else {
        output.success(&format!("Removed task: {}", id));
    }

    Ok(())
}
