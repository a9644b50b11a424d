// End-to-end evaluation scenarios: literal grids, reference chains, failure
// classification, and property-based checks over generated grids.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use gridcalc_engine::cell::{Cell, Resolved};
use gridcalc_engine::coord::{label_of, Coord};
use gridcalc_engine::error::EvalError;
use gridcalc_engine::eval::{evaluate, evaluate_with_report};
use gridcalc_engine::grid::Grid;
use gridcalc_engine::number::Number;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn grid(json: &str) -> Grid<Cell> {
    let rows: Vec<Vec<Cell>> = serde_json::from_str(json).expect("test grid JSON");
    Grid::from_rows(rows).expect("rectangular test grid")
}

fn eval_rows(json: &str) -> Vec<Vec<Resolved>> {
    evaluate(grid(json)).expect("grid evaluates").into_rows()
}

fn int(n: i64) -> Resolved {
    Some(Number::Int(n))
}

fn real(x: f64) -> Resolved {
    Some(Number::Float(x))
}

// ---------------------------------------------------------------------------
// Literal grids
// ---------------------------------------------------------------------------

#[test]
fn test_literal_grid_with_numeric_strings() {
    assert_eq!(
        eval_rows(r#"[[1, "2"], ["3", 4]]"#),
        vec![vec![int(1), int(2)], vec![int(3), int(4)]]
    );
}

#[test]
fn test_literal_grid_is_identity() {
    assert_eq!(
        eval_rows("[[5, -3], [0, 12]]"),
        vec![vec![int(5), int(-3)], vec![int(0), int(12)]]
    );
}

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

#[test]
fn test_single_reference_chain() {
    assert_eq!(
        eval_rows(r#"[[1, "=A1+1"], [3, "=A2+1"]]"#),
        vec![vec![int(1), int(2)], vec![int(3), int(4)]]
    );
}

#[test]
fn test_two_level_references() {
    assert_eq!(
        eval_rows(r#"[[1, "=A1 + 1"], ["=B1 + 1", "=A2 + B1"]]"#),
        vec![vec![int(1), int(2)], vec![int(3), int(5)]]
    );
}

#[test]
fn test_bare_reference_and_chained_formulas() {
    assert_eq!(
        eval_rows(r#"[[1, "=A1+1", "=A1 + B1"], ["=B1", "3", "=C1 + B2"]]"#),
        vec![vec![int(1), int(2), int(3)], vec![int(2), int(3), int(6)]]
    );
}

#[test]
fn test_forward_references() {
    // A1 resolves last even though it is first in reading order
    assert_eq!(
        eval_rows(r#"[["=C1+1", 3, "=B1+1"]]"#),
        vec![vec![int(5), int(3), int(4)]]
    );
}

#[test]
fn test_mixed_case_three_by_three() {
    let rows = eval_rows(
        r#"[["=C1+5", "=A3/2", "=c2-1"],
            ["=b3+7", 1, "=B1*4"],
            ["=B2+5", "=a1/5", "=A2-2"]]"#,
    );
    assert_eq!(rows[0], vec![int(16), int(3), int(11)]);
    assert_eq!(rows[1], vec![real(3.2 + 7.0), int(1), int(12)]);
    assert_eq!(rows[2], vec![int(6), real(3.2), real(3.2 + 7.0 - 2.0)]);
}

#[test]
fn test_deep_chain() {
    let mut row: Vec<Cell> = vec![Cell::Number(Number::Int(1))];
    for col in 1..200 {
        let prev = label_of(Coord::new(0, col - 1));
        row.push(Cell::Text(format!("={prev}+1")));
    }
    let (result, report) =
        evaluate_with_report(Grid::from_rows(vec![row]).expect("rectangular")).expect("evaluates");

    let values = result.into_rows();
    assert_eq!(values[0][199], int(200));
    assert_eq!(report.max_depth, 199);
    assert_eq!(report.formula_cells, 199);
}

#[test]
fn test_wide_fanout() {
    let mut row: Vec<Cell> = vec![Cell::Number(Number::Int(7))];
    for _ in 1..50 {
        row.push(Cell::Text("=A1*2".to_string()));
    }
    let values = evaluate(Grid::from_rows(vec![row]).expect("rectangular"))
        .expect("evaluates")
        .into_rows();
    assert!(values[0][1..].iter().all(|v| *v == int(14)));
}

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

#[test]
fn test_division_whole_quotient() {
    let rows = eval_rows(r#"[[4, "=A1/2"]]"#);
    assert_eq!(rows, vec![vec![int(4), int(2)]]);
    // Whole quotient is still a real value
    assert!(matches!(rows[0][1], Some(Number::Float(_))));
}

#[test]
fn test_division_fractional_quotient() {
    assert_eq!(eval_rows(r#"[[1, "=A1/2"]]"#), vec![vec![int(1), real(0.5)]]);
}

#[test]
fn test_division_by_zero() {
    let err = evaluate(grid(r#"[[1, "=A1/0"]]"#)).unwrap_err();
    assert_eq!(
        err,
        EvalError::DivisionByZero {
            cell: Coord::new(0, 1)
        }
    );
}

#[test]
fn test_division_by_zero_valued_cell() {
    let err = evaluate(grid(r#"[[0, "=C1/A1", 4]]"#)).unwrap_err();
    assert_eq!(
        err,
        EvalError::DivisionByZero {
            cell: Coord::new(0, 1)
        }
    );
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[test]
fn test_dangling_reference_out_of_bounds() {
    let err = evaluate(grid(r#"[[1, "=A5 + 2"], ["=B1 + 1", "=A2 + 1"]]"#)).unwrap_err();
    assert_eq!(
        err,
        EvalError::DanglingReference {
            cell: Coord::new(0, 1),
            target: Coord::new(4, 0),
            status: "out of bounds",
        }
    );
}

#[test]
fn test_dangling_reference_empty_cell() {
    let err = evaluate(grid(r#"[[null, "=A1+1"]]"#)).unwrap_err();
    assert_eq!(
        err,
        EvalError::DanglingReference {
            cell: Coord::new(0, 1),
            target: Coord::new(0, 0),
            status: "empty",
        }
    );
}

#[test]
fn test_circular_reference() {
    let err = evaluate(grid(r#"[["=B1 + 1", "=A1 + 1"]]"#)).unwrap_err();
    match err {
        EvalError::CircularReference(report) => {
            assert_eq!(report.cells, vec![Coord::new(0, 0), Coord::new(0, 1)]);
        }
        other => panic!("expected CircularReference, got {:?}", other),
    }
}

#[test]
fn test_self_reference() {
    let err = evaluate(grid(r#"[[1, "=B1+1"]]"#)).unwrap_err();
    match err {
        EvalError::CircularReference(report) => {
            assert_eq!(report.message, "cell B1 references itself");
        }
        other => panic!("expected CircularReference, got {:?}", other),
    }
}

#[test]
fn test_cycle_takes_precedence_over_dangling() {
    // B1/C1 cycle and A1 dangles on Z99; the cycle is reported
    let err = evaluate(grid(r#"[["=Z99", "=C1+1", "=B1+1"]]"#)).unwrap_err();
    match err {
        EvalError::CircularReference(report) => {
            assert_eq!(report.cells, vec![Coord::new(0, 1), Coord::new(0, 2)]);
        }
        other => panic!("expected CircularReference, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_aborts_whole_grid() {
    let err = evaluate(grid(r#"[[1, "=A1+1", "=1+2+3"]]"#)).unwrap_err();
    assert!(matches!(err, EvalError::Syntax { .. }));
}

#[test]
fn test_ragged_rows_rejected() {
    let rows: Vec<Vec<Cell>> = serde_json::from_str(r#"[[1, 2], [3]]"#).expect("grid JSON");
    let err = Grid::from_rows(rows).unwrap_err();
    assert_eq!(
        err,
        EvalError::RaggedInput {
            row: 2,
            expected: 2,
            found: 1,
        }
    );
}

// ---------------------------------------------------------------------------
// Property-based checks
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Seed value cells for chains and fanouts: small enough that no sum
/// overflows i64.
fn arb_seed() -> impl Strategy<Value = i64> {
    -10_000i64..10_000
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn prop_literal_grids_are_identity(
        values in prop::collection::vec(prop::collection::vec(arb_seed(), 1..8), 1..8)
    ) {
        // Pad rows to the widest one so the grid is rectangular
        let cols = values.iter().map(|r| r.len()).max().unwrap_or(1);
        let rows: Vec<Vec<Cell>> = values
            .iter()
            .map(|r| {
                (0..cols)
                    .map(|c| Cell::Number(Number::Int(*r.get(c).unwrap_or(&0))))
                    .collect()
            })
            .collect();

        let result = evaluate(Grid::from_rows(rows).expect("rectangular"))
            .expect("literal grids always evaluate")
            .into_rows();

        for (r, row) in result.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let expected = *values[r].get(c).unwrap_or(&0);
                prop_assert_eq!(*value, int(expected));
            }
        }
    }

    #[test]
    fn prop_chain_computes_prefix_sums(
        start in arb_seed(),
        deltas in prop::collection::vec(arb_seed(), 1..40)
    ) {
        let mut row: Vec<Cell> = vec![Cell::Number(Number::Int(start))];
        for (i, delta) in deltas.iter().enumerate() {
            let prev = label_of(Coord::new(0, i));
            // The grammar has no signed literals; spell negatives as subtraction
            let formula = if *delta >= 0 {
                format!("={prev}+{delta}")
            } else {
                format!("={prev}-{}", delta.unsigned_abs())
            };
            row.push(Cell::Text(formula));
        }

        let values = evaluate(Grid::from_rows(vec![row]).expect("rectangular"))
            .expect("chain evaluates")
            .into_rows();

        let mut expected = start;
        for (i, delta) in deltas.iter().enumerate() {
            expected += delta;
            prop_assert_eq!(values[0][i + 1], int(expected));
        }
    }

    #[test]
    fn prop_layout_reversal_preserves_values(
        values in prop::collection::vec(arb_seed(), 1..12)
    ) {
        // Row 0 holds literals, row 1 doubles the cell above. Reversing the
        // columns must reverse the outputs and nothing else: evaluation
        // order never leaks into results.
        let build = |vals: &[i64]| {
            let literals: Vec<Cell> = vals
                .iter()
                .map(|v| Cell::Number(Number::Int(*v)))
                .collect();
            let formulas: Vec<Cell> = (0..vals.len())
                .map(|c| Cell::Text(format!("={}*2", label_of(Coord::new(0, c)))))
                .collect();
            Grid::from_rows(vec![literals, formulas]).expect("rectangular")
        };

        let forward = evaluate(build(&values)).expect("evaluates").into_rows();
        let reversed_input: Vec<i64> = values.iter().rev().copied().collect();
        let backward = evaluate(build(&reversed_input)).expect("evaluates").into_rows();

        let mut backward_row = backward[1].clone();
        backward_row.reverse();
        prop_assert_eq!(&forward[1], &backward_row);
    }
}
