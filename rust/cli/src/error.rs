//! Error types for the CLI application.
//!
//! ## Batch Validation Errors
//!
//! `BatchValidationError<T>` collects per-item failures with context. `analyze`
//! uses it for skipped range lines and for scenario files that produced no rows.

use std::fmt;

use rangekpi_engine::errors::{KpiError, ParseError, PipelineError};

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Engine-related error
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<String> for CliError {
    fn from(error: String) -> Self {
        CliError::Engine(error)
    }
}

impl From<&str> for CliError {
    fn from(error: &str) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(error: PipelineError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ParseError> for CliError {
    fn from(error: ParseError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

// KPI definitions come from the configuration file
impl From<KpiError> for CliError {
    fn from(error: KpiError) -> Self {
        CliError::Config(error.to_string())
    }
}

/// Generic error type for batch validation operations.
///
/// # Examples
///
/// ```rust
/// use rangekpi_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: "Ah7d2c_check.txt:4".to_string(),
///     message: "Malformed range line 4: weight is not a number".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Ah7d2c_check.txt:4: Malformed range line 4: weight is not a number"
/// );
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    /// Descriptive error message
    pub message: String,
}

impl<T: std::fmt::Display> std::fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}
