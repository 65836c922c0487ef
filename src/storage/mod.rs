//! # Storage Layer
//!
//! Persistence layer for taskboard with plain, diffable file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSON array, newest first | `.taskboard/tasks.json` |
//! | Config | TOML | `.taskboard/config.toml` |
//! | Board log | Text | `.taskboard/board.log` |
//!
//! ## Concurrency Safety
//!
//! - [`BoardStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .taskboard/
//! ├── tasks.json            # All tasks
//! ├── config.toml           # Project configuration
//! ├── board.log             # Log of the last board session
//! └── .gitignore            # Ignores the log and temp files
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a taskboard project
//! - [`BoardStore`] - Read/write the task collection
//! - [`Config`] - Project and global configuration

mod board;
mod config;
mod project;

/// Directory holding a project's board and configuration
pub const PROJECT_DIR: &str = ".taskboard";

pub use board::{BoardStore, StoreError, BOARD_FILE};
pub use config::{BoardConfig, Config, ConfigError, DefaultFormat, GlobalConfig, ProjectConfig};
pub use project::{demo_tasks, Project, ProjectError, LOG_FILE};
