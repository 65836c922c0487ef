//! Domain models for taskboard
//!
//! Contains the scoring and planning logic without any I/O concerns. Every
//! function that depends on time takes the reference instant `now` as an
//! argument; nothing here reads the clock.

mod date;
mod id;
mod priority;
mod progress;
mod sprint;
mod task;
mod validate;

pub use date::{days_until, parse_instant};
pub use id::{id_from_title, TaskId};
pub use priority::{compute_priority, explain_priority, PriorityBreakdown};
pub use progress::{progress_summary, Progress};
pub use sprint::{assign_to_sprint, SprintPlan};
pub use task::{next_status, Action, Task, TaskStatus};
pub use validate::{validate_task, ValidationError};
