//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing flag) |
//! | 3       | I/O              | File read/write and codec failures       |
//! | 4-7     | Evaluation       | One code per evaluation failure class    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use gridcalc_engine::error::EvalError;
use gridcalc_io::error::IoError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// I/O (3)
// =============================================================================

/// File could not be read or written, or its encoding is broken.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Evaluation (4-7) — one code per failure class
// =============================================================================

/// Malformed formula text, or input that is not a valid grid (ragged rows).
pub const EXIT_SYNTAX: u8 = 4;

/// A formula references a cell outside the grid or one that is empty.
pub const EXIT_DANGLING: u8 = 5;

/// Formulas depend on each other in a cycle.
pub const EXIT_CIRCULAR: u8 = 6;

/// A division's right-hand side resolved to zero.
pub const EXIT_DIVISION: u8 = 7;

/// Map an evaluation failure to its exit code.
pub fn eval_exit_code(err: &EvalError) -> u8 {
    match err {
        EvalError::Syntax { .. } => EXIT_SYNTAX,
        EvalError::RaggedInput { .. } => EXIT_SYNTAX,
        EvalError::DanglingReference { .. } => EXIT_DANGLING,
        EvalError::CircularReference(_) => EXIT_CIRCULAR,
        EvalError::DivisionByZero { .. } => EXIT_DIVISION,
    }
}

/// Map an I/O-layer failure, unwrapping evaluation errors to their own codes.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Eval(inner) => eval_exit_code(inner),
        IoError::Io(_) | IoError::Json(_) | IoError::Csv(_) => EXIT_IO,
    }
}
