//! taskboard - task prioritization and sprint planning
//!
//! Scores tasks from labels, due dates, blocking and size, drives a small
//! status automaton, summarizes progress and fills sprints greedily. The
//! scoring core lives in [`domain`] and never reads the clock; the CLI and
//! the terminal board in [`cli`] persist tasks through [`storage`].

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Action, Progress, SprintPlan, Task, TaskId, TaskStatus, ValidationError};
