//! Project management
//!
//! Handles project initialization and provides access to the board.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;

use super::config::CONFIG_FILE;
use super::{BoardStore, Config, PROJECT_DIR};
use crate::domain::{Task, TaskStatus};

/// Log file used while the interactive board owns the terminal
pub const LOG_FILE: &str = "board.log";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in a taskboard project. Run 'taskboard init' first.")]
    NotInProject,
}

/// A taskboard project
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        if !project_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// With `demo` set, the board is seeded with sample tasks dated
    /// relative to `now`. An existing board is never overwritten.
    pub fn init(root: impl Into<PathBuf>, demo: bool, now: DateTime<Utc>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        let store = BoardStore::for_project(&root);
        if store.path().exists() {
            return Err(ProjectError::AlreadyExists(root).into());
        }

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        // Create default config
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# taskboard configuration

# Point capacity used by 'taskboard sprint' and the board
sprint_capacity = 13

[board]
# Show the Done column
show_done = true
# Event poll interval in milliseconds
tick_rate_ms = 250
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for the project directory
        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Board session log
board.log

# Interrupted writes
*.tmp
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let tasks = if demo { demo_tasks(now) } else { Vec::new() };
        store.write_all(&tasks)?;
        debug!(root = %root.display(), demo, "Initialized project");

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskboard directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the board store
    pub fn board_store(&self) -> BoardStore {
        BoardStore::for_project(&self.root)
    }

    /// Returns the path of the board session log
    pub fn log_path(&self) -> PathBuf {
        self.project_dir().join(LOG_FILE)
    }
}

/// Sample board used by `taskboard init --demo`, newest first
pub fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let in_days = |days: i64| (now + Duration::days(days)).format("%Y-%m-%d").to_string();

    vec![
        Task::titled("Login Bug")
            .with_points(3)
            .with_due(in_days(1))
            .with_status(TaskStatus::InProgress)
            .with_label("bug")
            .with_label("urgent"),
        Task::titled("Dokumentation Update")
            .with_points(2)
            .with_label("chore"),
        Task::titled("CI Fix")
            .with_points(5)
            .with_due(in_days(-1))
            .with_status(TaskStatus::Blocked)
            .with_label("bug")
            .with_blocker("t_99999"),
        Task::titled("Feature: Boards")
            .with_points(8)
            .with_due(in_days(6)),
        Task::titled("Refactor Utils")
            .with_points(1)
            .with_due(in_days(14))
            .with_status(TaskStatus::Done),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{progress_summary, validate_task};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), false, now()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join(CONFIG_FILE).exists());
        assert!(project.project_dir().join(".gitignore").exists());
        assert!(project.board_store().path().exists());
        assert!(project.board_store().read_all().unwrap().is_empty());
        assert_eq!(project.config().project.sprint_capacity, 13);
    }

    #[test]
    fn init_with_demo_seeds_board() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), true, now()).unwrap();

        let tasks = project.board_store().read_all().unwrap();
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[0].title, "Login Bug");
        assert_eq!(tasks[0].id.as_str(), "t_50754");
    }

    #[test]
    fn init_twice_fails() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path(), true, now()).unwrap();

        let err = Project::init(dir.path(), false, now()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::AlreadyExists(_))
        ));
        // Seeded board survives
        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.board_store().read_all().unwrap().len(), 5);
    }

    #[test]
    fn open_missing_project() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::NotInProject)
        ));
    }

    #[test]
    fn demo_tasks_are_valid() {
        let tasks = demo_tasks(now());
        for task in &tasks {
            validate_task(task).unwrap();
        }

        let progress = progress_summary(&tasks, now()).unwrap();
        assert_eq!(progress.total, 5);
        assert_eq!(progress.done, 1);
        assert_eq!(progress.overdue, 1);
        assert_eq!(progress.completion_pct, 20);
    }

    #[test]
    fn demo_due_dates_are_relative() {
        let tasks = demo_tasks(now());
        assert_eq!(tasks[0].due.as_deref(), Some("2025-08-11"));
        assert_eq!(tasks[1].due, None);
        assert_eq!(tasks[2].due.as_deref(), Some("2025-08-09"));
    }
}
