//! Batch evaluation: drive every cell of a grid to a numeric value.
//!
//! The scheduler is a worklist pass over the dependency graph. Literals and
//! reference-free formulas seed a ready queue; resolving a cell releases the
//! formulas waiting on it; whatever a drained queue leaves behind is
//! classified as a cycle or a dangling reference. All-or-nothing: any
//! failure aborts the whole pass with no partial grid.

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellState, Resolved};
use crate::coord::Coord;
use crate::dep_graph::DepGraph;
use crate::error::{CycleReport, EvalError};
use crate::formula::parser::{self, Expr, Op, Operand};
use crate::formula::refs::referenced_cells;
use crate::grid::Grid;
use crate::number::Number;

/// Report from one full evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    pub rows: usize,
    pub cols: usize,

    /// Cells that arrived as numbers (or integer strings).
    pub literal_cells: usize,

    /// Cells that arrived as formulas.
    pub formula_cells: usize,

    /// Cells that arrived empty (and stay empty in the output).
    pub empty_cells: usize,

    /// Maximum dependency depth encountered.
    /// A formula with no formula precedents has depth 1.
    /// A formula depending on another formula has depth = max(precedent depths) + 1.
    pub max_depth: usize,

    /// Time taken for the full pass in milliseconds.
    pub duration_ms: u64,
}

impl EvalReport {
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Format as a concise one-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "{} cells in {}ms, depth={}, formulas={}",
            self.cell_count(),
            self.duration_ms,
            self.max_depth,
            self.formula_cells
        )
    }

    /// Format as a one-line log entry.
    ///
    /// Format: `[eval/full]   14ms  628 cells  formulas=12  empty=3  depth=7`
    pub fn log_line(&self) -> String {
        format!(
            "[eval/full] {:>4}ms  {} cells  formulas={}  empty={}  depth={}",
            self.duration_ms,
            self.cell_count(),
            self.formula_cells,
            self.empty_cells,
            self.max_depth
        )
    }
}

/// Evaluate a grid of raw cells into a grid of numbers.
///
/// Empty input cells stay empty in the output; every other cell resolves to
/// a number. See [`evaluate_with_report`] for the instrumented variant.
pub fn evaluate(grid: Grid<Cell>) -> Result<Grid<Resolved>, EvalError> {
    evaluate_with_report(grid).map(|(resolved, _)| resolved)
}

/// Evaluate a grid and report pass statistics alongside the result.
pub fn evaluate_with_report(grid: Grid<Cell>) -> Result<(Grid<Resolved>, EvalReport), EvalError> {
    let start = Instant::now();
    let rows = grid.rows();
    let cols = grid.cols();

    let mut states: Grid<CellState> = Grid::new(rows, cols, CellState::Empty);
    let mut graph = DepGraph::new();
    let mut ready: Vec<Coord> = Vec::new();
    let mut literal_cells = 0usize;
    let mut formula_cells = 0usize;
    let mut empty_cells = 0usize;

    // Parse pass, row-major so the first syntax error in reading order wins.
    for (coord, cell) in grid.iter() {
        match cell {
            Cell::Empty => {
                empty_cells += 1;
            }
            Cell::Number(n) => {
                states.set(coord, CellState::Literal(*n));
                literal_cells += 1;
                ready.push(coord);
            }
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    empty_cells += 1;
                } else if trimmed.starts_with('=') {
                    let expr = parser::parse(trimmed)
                        .map_err(|reason| EvalError::Syntax { cell: coord, reason })?;
                    states.set(coord, CellState::Expression(expr));
                    formula_cells += 1;

                    let refs = referenced_cells(&expr);
                    if refs.is_empty() {
                        ready.push(coord);
                    } else {
                        graph.add_formula(coord, refs);
                    }
                } else {
                    let n: i64 = trimmed.parse().map_err(|_| EvalError::Syntax {
                        cell: coord,
                        reason: format!("not a number: {trimmed}"),
                    })?;
                    states.set(coord, CellState::Literal(Number::Int(n)));
                    literal_cells += 1;
                    ready.push(coord);
                }
            }
        }
    }

    // Pop-smallest queue: sort in DESCENDING order so the row-major-first
    // cell is at the end. Evaluation order must not affect the result; the
    // deterministic order just makes failures reproducible.
    ready.sort_by(|a, b| b.cmp(a));

    let mut depths: FxHashMap<Coord, usize> = FxHashMap::default();
    let mut max_depth = 0usize;

    while let Some(coord) = ready.pop() {
        let Some(&state) = states.get(coord) else {
            continue;
        };
        let value = match state {
            CellState::Literal(n) => n,
            CellState::Expression(expr) => {
                let value = reduce(coord, &expr, &states)?;
                let depth = 1 + referenced_cells(&expr)
                    .into_iter()
                    .filter_map(|target| depths.get(&target).copied())
                    .max()
                    .unwrap_or(0);
                depths.insert(coord, depth);
                max_depth = max_depth.max(depth);
                value
            }
            CellState::Empty | CellState::Resolved(_) => continue,
        };

        states.set(coord, CellState::Resolved(value));

        let released = graph.mark_resolved(coord);
        // Push in reverse so the smallest released cell is popped first
        for cell in released.into_iter().rev() {
            ready.push(cell);
        }
    }

    if graph.blocked_count() > 0 {
        return Err(residual_error(&graph, &states));
    }

    let resolved = states.map(|_, state| match state {
        CellState::Empty => None,
        CellState::Literal(n) | CellState::Resolved(n) => Some(n),
        // the queue drained with nothing blocked, so no Expression remains
        CellState::Expression(_) => unreachable!(),
    });

    let report = EvalReport {
        rows,
        cols,
        literal_cells,
        formula_cells,
        empty_cells,
        max_depth,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok((resolved, report))
}

/// Compute the value of a formula whose references have all resolved.
fn reduce(cell: Coord, expr: &Expr, states: &Grid<CellState>) -> Result<Number, EvalError> {
    match expr {
        Expr::Operand(op) => Ok(operand_value(*op, states)),
        Expr::Binary { op, left, right } => {
            let lhs = operand_value(*left, states);
            let rhs = operand_value(*right, states);
            match op {
                Op::Add => Ok(lhs.add(rhs)),
                Op::Sub => Ok(lhs.sub(rhs)),
                Op::Mul => Ok(lhs.mul(rhs)),
                Op::Div => lhs
                    .checked_div(rhs)
                    .ok_or(EvalError::DivisionByZero { cell }),
            }
        }
    }
}

fn operand_value(operand: Operand, states: &Grid<CellState>) -> Number {
    match operand {
        Operand::Literal(n) => Number::Int(n),
        Operand::Ref(target) => match states.get(target) {
            Some(CellState::Resolved(n)) => *n,
            // a formula is released only after every reference resolved
            _ => unreachable!(),
        },
    }
}

/// Classify the cells left blocked after the queue drained.
///
/// A cycle group explains a stall structurally, so it is reported even when
/// other blocked cells also carry dangling references. Only with no cycle
/// anywhere is the first dangling (referrer, target) pair in row-major
/// order reported, distinguishing out-of-grid targets from empty cells.
fn residual_error(graph: &DepGraph, states: &Grid<CellState>) -> EvalError {
    let sccs = graph.find_cycle_sccs();
    if let Some(scc) = sccs.into_iter().min_by_key(|group| group.first().copied()) {
        return EvalError::CircularReference(CycleReport::cycle(scc));
    }

    for cell in graph.blocked_cells() {
        for target in graph.blocking_set(cell) {
            if !states.contains(target) {
                return EvalError::DanglingReference {
                    cell,
                    target,
                    status: "out of bounds",
                };
            }
            if let Some(CellState::Empty) = states.get(target) {
                return EvalError::DanglingReference {
                    cell,
                    target,
                    status: "empty",
                };
            }
        }
    }

    // Every blocked cell waits only on in-bounds, non-empty cells; those are
    // themselves blocked, so the residual graph had to contain a cycle.
    unreachable!()
}
