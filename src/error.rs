//! Host-facing errors. Simulated faults are never errors; they travel as
//! Error/Unknown bits.

use thiserror::Error;

/// Errors from building or parsing a fuse map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuseMapError {
    #[error("missing fuse map header")]
    MissingHeader,
    #[error("invalid fuse map header: {0:?}")]
    InvalidHeader(String),
    #[error("expected {expected} fuse rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row}: expected {expected} fuses, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: invalid fuse character {found:?}")]
    InvalidCharacter { row: usize, found: char },
    #[error("expected a {expected_rows}x{expected_cols} fuse map, found {rows}x{cols}")]
    Dimensions {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("fuse ({row}, {col}) outside a {rows}x{cols} map")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Errors from loading component and bench configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown component type '{0}'")]
    UnknownComponent(String),
    #[error("{component}: no pin named '{pin}'")]
    UnknownPin { component: String, pin: String },
    #[error("{component}: pin '{pin}' is not an output")]
    NotAnOutput { component: String, pin: String },
    #[error("pin '{pin}': invalid level {value:?}")]
    InvalidLevel { pin: String, value: String },
    #[error("property '{name}': {reason}")]
    InvalidProperty { name: String, reason: String },
    #[error("fuse map error: {0}")]
    FuseMap(#[from] FuseMapError),
}
