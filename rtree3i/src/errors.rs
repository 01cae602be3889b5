//! Error and result types for R-tree operations.

use thiserror::Error;

/// Errors that can occur while building boxes, configurations or trees.
///
/// All of these are precondition violations reported at the call that
/// violates them. Looking up or removing a missing key is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RTreeError {
    #[error("Invalid box: ({x1}, {y1}, {z1}) to ({x2}, {y2}, {z2}) has a minimum greater than its maximum")]
    InvalidBox {
        x1: i32,
        y1: i32,
        z1: i32,
        x2: i32,
        y2: i32,
        z2: i32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),
}

/// Result type for R-tree operations
pub type RTreeResult<T> = Result<T, RTreeError>;
