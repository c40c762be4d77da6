use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Invalid rank character '{0}' (expected 2-9, T, J, Q, K or A)")]
    InvalidRank(char),
    #[error("Invalid suit character '{0}' (expected h, d, c or s)")]
    InvalidSuit(char),
    #[error("Malformed card string: '{0}'")]
    Malformed(String),
}

/// Failures while turning raw range input into structured entries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed range line {line}: {reason}")]
    MalformedRangeLine { line: usize, reason: String },
    #[error("Invalid rank '{rank}' on line {line}")]
    InvalidRank { line: usize, rank: char },
    #[error("Invalid scenario name '{name}': {reason}")]
    InvalidScenarioName { name: String, reason: String },
    #[error("Invalid board: {0}")]
    InvalidBoard(String),
}

/// Configuration errors detected while validating KPI definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KpiError {
    #[error("KPI '{kpi}': operator '{operator}' cannot be applied to column '{column}' ({reason})")]
    ColumnTypeMismatch {
        kpi: String,
        column: String,
        operator: String,
        reason: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No range entries available for {source_name}")]
    EmptyInputPopulation { source_name: String },
}
