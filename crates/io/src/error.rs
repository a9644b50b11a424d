//! Error type for grid reading and writing.

use thiserror::Error;

use gridcalc_engine::error::EvalError;

/// Everything that can go wrong between a file on disk and a resolved grid.
///
/// Evaluation failures pass through unchanged so callers can still match on
/// the `EvalError` variant; the rest wrap the underlying I/O or codec error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("{0}")]
    Eval(#[from] EvalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
