//! Evaluation failure taxonomy.
//!
//! Every error aborts the whole evaluate call; no partial grid is returned.

use thiserror::Error;

use crate::coord::Coord;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Malformed formula text or literal. Local to one cell, detected during
    /// the parse pass.
    #[error("syntax error in {cell}: {reason}")]
    Syntax { cell: Coord, reason: String },

    /// A well-formed reference to a coordinate outside the grid or to a cell
    /// that was never given a value. Detected only after the worklist drains.
    #[error("dangling reference in {cell}: {target} is {status}")]
    DanglingReference {
        cell: Coord,
        target: Coord,
        /// "out of bounds" or "empty"
        status: &'static str,
    },

    /// A formula cycle, including a formula referencing itself.
    #[error("{0}")]
    CircularReference(CycleReport),

    /// Division by exactly zero during reduction.
    #[error("division by zero in {cell}")]
    DivisionByZero { cell: Coord },

    /// Rows of unequal length at grid construction. `row` is 1-based.
    #[error("ragged grid: row {row} has {found} cells, expected {expected}")]
    RaggedInput {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Cells participating in a detected reference cycle.
///
/// `cells` may be a subset of one cycle group for large cycles; `message`
/// is the rendered description.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cells: Vec<Coord>,
    pub message: String,
}

impl CycleReport {
    pub fn new(cells: Vec<Coord>, message: impl Into<String>) -> Self {
        Self {
            cells,
            message: message.into(),
        }
    }

    /// Report for a cell whose formula references itself.
    pub fn self_reference(cell: Coord) -> Self {
        Self {
            cells: vec![cell],
            message: format!("cell {} references itself", cell),
        }
    }

    /// Report for a multi-cell cycle. A single-cell group is a self-loop.
    pub fn cycle(cells: Vec<Coord>) -> Self {
        if cells.len() == 1 {
            return Self::self_reference(cells[0]);
        }
        let labels: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        let message = if cells.len() <= 5 {
            format!("circular reference: {}", labels.join(" → "))
        } else {
            format!(
                "circular reference involving {} cells: {} → ... → {}",
                cells.len(),
                labels[0],
                labels[labels.len() - 1]
            )
        };
        Self { cells, message }
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
