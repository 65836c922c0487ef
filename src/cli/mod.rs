//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init`, `init --demo` |
//! | Task | Board mutations | `task add`, `task start`, `task finish` |
//! | Query | Board queries | `summary`, `sprint`, `id` |
//! | Calc | Stateless scoring on JSON | `calc priority`, `calc sprint` |
//! | Board | Interactive kanban | `board` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON; failures become a JSON object on
//!   stderr with an [`ErrorKind`]
//!
//! ## Reference Time
//!
//! Date logic runs against `--now` (or `TASKBOARD_NOW`) when given, the
//! wall clock otherwise:
//! ```bash
//! taskboard --now 2025-08-10 sprint --capacity 8
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments, execute the appropriate command and
//! get the process exit code.

mod app;
mod calc;
mod output;
mod query;
mod task;
mod tui;

pub use app::{run, Cli, Commands};
pub use calc::CalcError;
pub use output::{ErrorKind, Output, OutputFormat};
