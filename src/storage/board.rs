//! JSON storage for the task board
//!
//! The whole collection lives in `.taskboard/tasks.json` as one JSON array,
//! newest task first. Every operation reads the full array and every change
//! rewrites it. Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::domain::{validate_task, Action, Task, TaskId, ValidationError};

/// File name of the board inside the project directory
pub const BOARD_FILE: &str = "tasks.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task already exists: {0}")]
    DuplicateId(TaskId),

    #[error("Invalid task '{id}': {source}")]
    InvalidTask {
        id: TaskId,
        #[source]
        source: ValidationError,
    },
}

/// Store for the task collection of a project
pub struct BoardStore {
    path: PathBuf,
}

impl BoardStore {
    /// Creates a new board store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(super::PROJECT_DIR).join(BOARD_FILE))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection, validating every task
    pub fn read_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open board: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on board")?;

        let reader = BufReader::new(&file);
        let tasks: Vec<Task> = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse board: {}", self.path.display()))?;

        for task in &tasks {
            validate_task(task).map_err(|source| StoreError::InvalidTask {
                id: task.id.clone(),
                source,
            })?;
        }

        debug!(path = %self.path.display(), count = tasks.len(), "Loaded board");

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes the whole collection (full rewrite)
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on board")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, tasks).context("Failed to serialize board")?;
            writeln!(writer).context("Failed to write board")?;
            writer.flush().context("Failed to flush board")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), count = tasks.len(), "Saved board");
        Ok(())
    }

    /// Returns the task with the given ID
    pub fn get(&self, id: &TaskId) -> Result<Task> {
        self.read_all()?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()).into())
    }

    /// Adds a task at the top of the board
    pub fn create(&self, task: Task) -> Result<Task> {
        validate_task(&task).map_err(|source| StoreError::InvalidTask {
            id: task.id.clone(),
            source,
        })?;

        let mut tasks = self.read_all()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::DuplicateId(task.id).into());
        }

        tasks.insert(0, task.clone());
        self.write_all(&tasks)?;
        Ok(task)
    }

    /// Applies a status action to a task and returns the updated record
    pub fn apply(&self, id: &TaskId, action: Action) -> Result<Task> {
        let mut tasks = self.read_all()?;
        let slot = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let updated = slot.apply(action);
        debug!(id = %id, from = %slot.status, to = %updated.status, %action, "Status transition");
        *slot = updated.clone();

        self.write_all(&tasks)?;
        Ok(updated)
    }

    /// Removes a task by ID
    pub fn remove(&self, id: &TaskId) -> Result<bool> {
        let mut tasks = self.read_all()?;
        let len_before = tasks.len();
        tasks.retain(|t| &t.id != id);
        let removed = tasks.len() != len_before;
        if removed {
            self.write_all(&tasks)?;
        }
        Ok(removed)
    }
}
