use serde::{Deserialize, Serialize};

use crate::formula::parser::Expr;
use crate::number::Number;

/// Raw cell content as it arrives from a file or caller.
///
/// `Text` is not yet classified: it may be a formula (leading `=`) or an
/// integer literal spelled as a string. Classification happens during the
/// parse pass of an evaluation.
///
/// Serialized untagged: `Empty` is JSON `null`, `Number` a number, `Text`
/// a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(Number),
    Text(String),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl Cell {
    /// Classify a raw input field the way a spreadsheet edit box would:
    /// blank is empty, a parseable number is a number, everything else is
    /// kept as text for the formula pass to judge.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Cell::Empty;
        }

        if let Ok(n) = trimmed.parse::<i64>() {
            return Cell::Number(Number::Int(n));
        }

        // Spellings like "inf", "nan", or "1e999" parse as f64 but have no
        // JSON representation; keep them text so stored numbers stay finite.
        if let Ok(x) = trimmed.parse::<f64>() {
            if x.is_finite() {
                return Cell::Number(Number::Float(x));
            }
        }

        Cell::Text(trimmed.to_string())
    }
}

/// State of one cell as an evaluation pass drives it to completion.
///
/// `Literal` and `Empty` come straight from the input; `Expression` is a
/// parsed formula waiting on its references; `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellState {
    Empty,
    Literal(Number),
    Expression(Expr),
    Resolved(Number),
}

/// Output entry of a successful evaluation: a number, or `None` where the
/// input cell was empty.
pub type Resolved = Option<Number>;
