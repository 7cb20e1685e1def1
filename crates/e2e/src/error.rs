//! Error types for scenario execution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("WebDriver command failed: {0}")]
    Command(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Header row with 'TC ID' not found")]
    HeaderNotFound,

    #[error("Required columns not found in header: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Input element not found within {0} ms")]
    InputNotFound(u64),

    #[error("Scenario timed out after {0} ms")]
    ScenarioTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(#[from] transcheck_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<fantoccini::error::CmdError> for HarnessError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        HarnessError::Command(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for HarnessError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        HarnessError::Session(e.to_string())
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
