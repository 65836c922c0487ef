//! Interactive terminal board
//!
//! A kanban view of the project board using ratatui. Every action goes
//! through the same store and scoring functions as the CLI commands.

mod app;
mod event;
mod utils;
mod views;

use std::io::{self, stdout, Stdout};
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::CrosstermBackend;

use super::Output;
use crate::storage::Project;
use app::App;
use event::EventHandler;

/// Terminal type alias
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Launch the board
pub fn run(output: &Output, pinned_now: Option<DateTime<Utc>>) -> Result<()> {
    let project = Project::open_current()?;
    let tick_rate_ms = project.config().project.board.tick_rate_ms;
    output.verbose_ctx(
        "board",
        &format!("Logging to {}", project.log_path().display()),
    );

    // Load before taking over the terminal so errors print normally
    let mut app = App::new(project, pinned_now)?;

    let mut terminal = init_terminal()?;
    let events = EventHandler::new(tick_rate_ms);

    // Restore the terminal even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(&mut terminal, events)));
    let restore_result = restore_terminal();

    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("Board panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("Board panicked: {}", s))
            } else {
                Err(anyhow!("Board panicked with unknown error"))
            }
        }
    }
}

fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(ratatui::Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
