//! Output formatting for CLI commands
//!
//! In JSON mode every command prints exactly one document: the result on
//! stdout, or an error object on stderr:
//!
//! ```json
//! {"success": false, "kind": "invalid_input", "error": "Invalid input: ..."}
//! ```

use serde::Serialize;

use super::calc::CalcError;
use crate::domain::ValidationError;
use crate::storage::{ConfigError, DefaultFormat, ProjectError, StoreError};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<DefaultFormat> for OutputFormat {
    fn from(format: DefaultFormat) -> Self {
        match format {
            DefaultFormat::Text => OutputFormat::Text,
            DefaultFormat::Json => OutputFormat::Json,
        }
    }
}

/// Category of a failed command, reported as `kind` in JSON errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed JSON or wrong shape
    InvalidInput,
    /// A task, capacity or timestamp broke a model rule
    Validation,
    NotFound,
    DuplicateId,
    NotInProject,
    AlreadyExists,
    Config,
    /// I/O and everything else
    Internal,
}

impl ErrorKind {
    /// Classifies an error by the first typed cause in its chain
    pub fn of(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<CalcError>() {
                return match e {
                    CalcError::InvalidInput(_) => ErrorKind::InvalidInput,
                    CalcError::Validation(_) => ErrorKind::Validation,
                };
            }
            if let Some(e) = cause.downcast_ref::<StoreError>() {
                return match e {
                    StoreError::NotFound(_) => ErrorKind::NotFound,
                    StoreError::DuplicateId(_) => ErrorKind::DuplicateId,
                    StoreError::InvalidTask { .. } => ErrorKind::Validation,
                };
            }
            if let Some(e) = cause.downcast_ref::<ProjectError>() {
                return match e {
                    ProjectError::NotInProject => ErrorKind::NotInProject,
                    ProjectError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                };
            }
            if cause.is::<ValidationError>() {
                return ErrorKind::Validation;
            }
            if cause.is::<ConfigError>() {
                return ErrorKind::Config;
            }
        }
        ErrorKind::Internal
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        if self.is_json() {
            println!("{}", serde_json::json!({ "success": true, "message": message }));
        } else {
            println!("{}", message);
        }
    }

    /// Reports a failed command on stderr
    pub fn error(&self, err: &anyhow::Error) {
        if self.is_json() {
            eprintln!("{}", error_document(err));
        } else {
            eprintln!("Error: {:#}", err);
        }
    }

    /// Prints structured data; text callers without a rendering get pretty JSON
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

fn error_document(err: &anyhow::Error) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "kind": ErrorKind::of(err),
        "error": format!("{:#}", err),
    })
}
