//! Main CLI application structure

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{calc, query, task, tui};
use crate::domain::{parse_instant, ValidationError};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(author, version, about = "Task prioritization and sprint planning board")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Reference time for due dates (YYYY-MM-DD or RFC 3339, defaults to now)
    #[arg(long, global = true, env = "TASKBOARD_NOW")]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskboard project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Seed the board with sample tasks
        #[arg(long)]
        demo: bool,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Show board progress
    Summary,

    /// Plan a sprint from the board
    Sprint {
        /// Point capacity (defaults to sprint_capacity from config)
        #[arg(long, short, allow_negative_numbers = true)]
        capacity: Option<i64>,
    },

    /// Derive a task ID from a title
    Id {
        /// Task title
        title: String,
    },

    /// Run a calculation on JSON input without touching the board
    #[command(subcommand)]
    Calc(calc::CalcCommands),

    /// Open the interactive board
    Board,
}

/// Main entry point for the CLI
///
/// Failures are reported through [`Output::error`], so `--format json`
/// callers get a JSON error document.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let global = Config::load_global();
    let format = cli.format.unwrap_or_else(|| {
        global
            .as_ref()
            .map(|g| OutputFormat::from(g.default_format))
            .unwrap_or_default()
    });
    let output = Output::new(format, cli.verbose);

    match global.and_then(|_| execute(cli, &output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli, output: &Output) -> Result<()> {
    // The board owns the terminal, so its logs go to a file
    let log_file = match cli.command {
        Commands::Board => Some(open_board_log()?),
        _ => None,
    };
    init_tracing(cli.verbose, log_file);

    output.verbose("taskboard starting");

    let pinned = resolve_now(cli.now.as_deref())?;
    let now = pinned.unwrap_or_else(Utc::now);
    output.verbose(&format!("Reference time: {}", now.to_rfc3339()));

    match cli.command {
        Commands::Init { path, demo } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path, demo, now)?;
            output.verbose_ctx(
                "init",
                &format!("Created board at: {}", project.board_store().path().display()),
            );
            let seeded = if demo { " with demo tasks" } else { "" };
            output.success(&format!(
                "Initialized taskboard project at {}{}",
                project.root().display(),
                seeded
            ));
        }

        Commands::Task(cmd) => task::run(cmd, output, now)?,

        Commands::Summary => {
            output.verbose("Summarizing board");
            query::summary(output, now)?
        }
        Commands::Sprint { capacity } => query::sprint(output, capacity, now)?,
        Commands::Id { title } => query::id(output, &title)?,

        Commands::Calc(cmd) => calc::run(cmd, output, now)?,

        Commands::Board => tui::run(output, pinned)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Parses `--now`; `None` means follow the wall clock
fn resolve_now(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    parse_instant(raw)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()).into())
}

/// Installs the tracing subscriber: `debug` with --verbose, `warn` otherwise,
/// `RUST_LOG` overrides both
fn init_tracing(verbose: bool, log_file: Option<File>) {
    let default = if verbose { "taskboard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // A subscriber may already be installed (tests); keep it
    let _ = match log_file {
        Some(file) => builder
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

fn open_board_log() -> Result<File> {
    let project = Project::open_current()?;
    let path = project.log_path();
    File::create(&path).with_context(|| format!("Failed to create log file: {}", path.display()))
}
