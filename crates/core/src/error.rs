//! Error types for HydroFlux

use thiserror::Error;

/// Main error type for HydroFlux operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Grid size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Factor {factor} does not evenly divide grid dimensions {rows}x{cols}")]
    NotDivisible { factor: usize, rows: usize, cols: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("No value found in reclassification table for {0}")]
    UnmappedValue(f64),

    #[error("Basin {basin} references downstream basin {downstream}, but it does not exist")]
    UnknownDownstreamBasin { basin: i32, downstream: i32 },

    #[error("Duplicate basin id {0}")]
    DuplicateBasin(i32),

    #[error("Cycle detected: {unresolved} basins are unreachable from any river mouth")]
    BasinCycle { unresolved: usize },

    #[error("Flow accumulation did not converge within {0} rounds; directions contain a cycle")]
    IterationCapExceeded(usize),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for HydroFlux operations
pub type Result<T> = std::result::Result<T, Error>;
