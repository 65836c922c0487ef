//! Stateless calculator commands
//!
//! Each command reads JSON from a file (or `-` for stdin), runs one scoring
//! function and prints the result. Nothing touches the board.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::output::Output;
use crate::domain::{
    assign_to_sprint, explain_priority, next_status, progress_summary, Action, Task, TaskId,
    TaskStatus, ValidationError,
};

/// Failures reported by calculator commands
#[derive(Debug, Error)]
pub enum CalcError {
    /// Malformed JSON or wrong shape, detected before scoring
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Subcommand)]
pub enum CalcCommands {
    /// Score one task (JSON object)
    Priority {
        /// Task file, or '-' for stdin
        input: String,

        /// Show each adjustment that makes up the score
        #[arg(long)]
        explain: bool,
    },

    /// Apply an action to a status
    NextStatus {
        /// Current status (todo, in_progress, blocked, done)
        current: String,

        /// Action (start, block, unblock, finish)
        action: String,
    },

    /// Summarize a task array (JSON)
    Summary {
        /// Tasks file, or '-' for stdin
        input: String,
    },

    /// Pick tasks for a sprint from a task array (JSON)
    Sprint {
        /// Tasks file, or '-' for stdin
        input: String,

        /// Point capacity
        #[arg(long, short, allow_negative_numbers = true)]
        capacity: i64,
    },
}

pub fn run(cmd: CalcCommands, output: &Output, now: DateTime<Utc>) -> Result<()> {
    match cmd {
        CalcCommands::Priority { input, explain } => priority(output, &input, explain, now),
        CalcCommands::NextStatus { current, action } => next(output, &current, &action),
        CalcCommands::Summary { input } => summary(output, &input, now),
        CalcCommands::Sprint { input, capacity } => sprint(output, &input, capacity, now),
    }
}

/// Reads and decodes JSON from a path or stdin
fn read_input<T: DeserializeOwned>(source: &str) -> Result<T> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    serde_json::from_str(&raw).map_err(|e| CalcError::InvalidInput(e.to_string()).into())
}

fn priority(output: &Output, input: &str, explain: bool, now: DateTime<Utc>) -> Result<()> {
    let task: Task = read_input(input)?;
    output.verbose_ctx("calc", &format!("Scoring task {}", task.id));

    let breakdown = explain_priority(&task, now).map_err(CalcError::from)?;

    if output.is_json() {
        if explain {
            output.data(&serde_json::json!({
                "priority": breakdown.score,
                "breakdown": breakdown,
            }));
        } else {
            output.data(&serde_json::json!({ "priority": breakdown.score }));
        }
    } else {
        println!("Priority: {}", breakdown.score);
        if explain {
            println!("  base:    {:+}", breakdown.base);
            println!("  labels:  {:+}", breakdown.labels);
            println!("  due:     {:+}", breakdown.due);
            println!("  blocked: {:+}", breakdown.blocked);
            println!("  size:    {:+}", breakdown.size);
            println!("  raw:     {}", breakdown.raw());
        }
    }

    Ok(())
}

fn next(output: &Output, current: &str, action: &str) -> Result<()> {
    let current: TaskStatus = current.trim().parse().map_err(CalcError::from)?;
    let action: Action = action.trim().parse().map_err(CalcError::from)?;

    let next = next_status(current, action);

    if output.is_json() {
        output.data(&serde_json::json!({ "next": next }));
    } else {
        println!("{} --{}--> {}", current, action, next);
    }

    Ok(())
}

fn summary(output: &Output, input: &str, now: DateTime<Utc>) -> Result<()> {
    let tasks: Vec<Task> = read_input(input)?;
    output.verbose_ctx("calc", &format!("Summarizing {} tasks", tasks.len()));

    let progress = progress_summary(&tasks, now).map_err(CalcError::from)?;

    if output.is_json() {
        output.data(&progress);
    } else {
        super::query::print_progress(&progress);
    }

    Ok(())
}

fn sprint(output: &Output, input: &str, capacity: i64, now: DateTime<Utc>) -> Result<()> {
    let tasks: Vec<Task> = read_input(input)?;
    output.verbose_ctx(
        "calc",
        &format!("Assigning {} tasks to capacity {}", tasks.len(), capacity),
    );

    let plan = assign_to_sprint(&tasks, capacity, now).map_err(CalcError::from)?;

    if output.is_json() {
        output.data(&plan);
    } else {
        println!("Selected:  {}", join_ids(&plan.selected));
        println!("Remaining: {}", join_ids(&plan.remaining));
    }

    Ok(())
}

pub(super) fn join_ids(ids: &[TaskId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
}
