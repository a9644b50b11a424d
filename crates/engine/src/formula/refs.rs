//! Reference extraction from parsed formulas.
//!
//! Derives the blocking set of a formula cell: the distinct coordinates its
//! expression references. With at most two operands this set has 0, 1, or 2
//! entries.

use rustc_hash::FxHashSet;

use crate::coord::Coord;

use super::parser::{Expr, Operand};

/// Distinct cell coordinates referenced by an expression.
///
/// A formula with an empty set is immediately evaluable.
pub fn referenced_cells(expr: &Expr) -> FxHashSet<Coord> {
    let mut refs = FxHashSet::default();
    match expr {
        Expr::Operand(op) => collect(op, &mut refs),
        Expr::Binary { left, right, .. } => {
            collect(left, &mut refs);
            collect(right, &mut refs);
        }
    }
    refs
}

fn collect(operand: &Operand, refs: &mut FxHashSet<Coord>) {
    if let Operand::Ref(target) = operand {
        refs.insert(*target);
    }
}
