//! Query commands (summary, sprint, id)
//!
//! These commands read the whole board and never modify it.

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::calc::{join_ids, CalcError};
use super::output::Output;
use crate::domain::{
    assign_to_sprint, compute_priority, id_from_title, progress_summary, Progress, TaskId,
};
use crate::storage::Project;

/// Show the progress of the board
pub fn summary(output: &Output, now: DateTime<Utc>) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx(
        "summary",
        &format!("Opened project at: {}", project.root().display()),
    );

    let tasks = project.board_store().read_all()?;
    let progress = progress_summary(&tasks, now).map_err(CalcError::from)?;

    if output.is_json() {
        output.data(&progress);
    } else {
        print_progress(&progress);
    }

    Ok(())
}

/// Prints a progress block in text form
pub fn print_progress(progress: &Progress) {
    println!(
        "Progress: {}/{} done ({}%)",
        progress.done, progress.total, progress.completion_pct
    );
    println!("{}", "=".repeat(40));
    println!("  [ ] Todo:        {}", progress.todo);
    println!("  [~] In Progress: {}", progress.in_progress);
    println!("  [!] Blocked:     {}", progress.blocked);
    println!("  [x] Done:        {}", progress.done);
    println!();
    println!("  Overdue:         {}", progress.overdue);
}

/// Plan a sprint from the board
pub fn sprint(output: &Output, capacity: Option<i64>, now: DateTime<Utc>) -> Result<()> {
    let project = Project::open_current()?;
    let capacity = capacity.unwrap_or(project.config().project.sprint_capacity);
    output.verbose_ctx("sprint", &format!("Capacity: {}", capacity));

    let tasks = project.board_store().read_all()?;
    let plan = assign_to_sprint(&tasks, capacity, now).map_err(CalcError::from)?;

    output.verbose_ctx(
        "sprint",
        &format!(
            "Selected {} of {} open tasks",
            plan.selected.len(),
            plan.selected.len() + plan.remaining.len()
        ),
    );

    if output.is_json() {
        output.data(&plan);
        return Ok(());
    }

    if plan.selected.is_empty() {
        println!("No tasks fit a sprint of {} points.", capacity);
    } else {
        let lookup = |id: &TaskId| tasks.iter().find(|t| &t.id == id);

        println!("Sprint ({} points):", capacity);
        println!("{:<10} {:>6} {:>4} TITLE", "ID", "POINTS", "PRIO");
        println!("{}", "-".repeat(60));

        let mut used: i64 = 0;
        for task in plan.selected.iter().filter_map(lookup) {
            used = used.saturating_add(task.points);
            let priority = compute_priority(task, now).unwrap_or(0);
            println!(
                "{:<10} {:>6} {:>4} {}",
                task.id, task.points, priority, task.title
            );
        }
        println!();
        println!("Used {} of {} points", used, capacity);
    }

    println!("Remaining: {}", join_ids(&plan.remaining));

    Ok(())
}

/// Show the identifier derived from a title
pub fn id(output: &Output, title: &str) -> Result<()> {
    let id = id_from_title(title);

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }

    Ok(())
}
