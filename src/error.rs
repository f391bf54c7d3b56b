use std::fmt;

#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectorError {
    #[error("Invalid input: {}", describe_issues(.0))]
    InvalidInput(Vec<InputIssue>),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProjectorError {
    /// Issues carried by an `InvalidInput` error, empty for every other kind.
    pub fn issues(&self) -> &[InputIssue] {
        match self {
            Self::InvalidInput(issues) => issues,
            _ => &[],
        }
    }
}

/// One invalid field found while validating a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct InputIssue {
    /// Zero-based position in the period sequence; `None` for scalar arguments.
    pub row: Option<usize>,
    pub label: Option<String>,
    pub field: String,
    pub message: String,
}

impl InputIssue {
    pub fn row(row: usize, label: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            label: Some(label.to_string()).filter(|l| !l.is_empty()),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn argument(field: &str, message: impl Into<String>) -> Self {
        Self {
            row: None,
            label: None,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.label) {
            (Some(row), Some(label)) => write!(f, "row {} ({label}) ", row + 1)?,
            (Some(row), None) => write!(f, "row {} ", row + 1)?,
            _ => {}
        }
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn describe_issues(issues: &[InputIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(feature = "python")]
impl From<ProjectorError> for PyErr {
    fn from(err: ProjectorError) -> PyErr {
        match err {
            ProjectorError::InvalidInput(_)
            | ProjectorError::MissingColumn(_)
            | ProjectorError::Config(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
