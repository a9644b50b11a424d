//! Dependency graph for formula cells awaiting resolution.
//!
//! Tracks blocking sets (the unresolved cells a formula still waits on) and
//! reverse adjacency (the formulas waiting on a given cell) so that resolving
//! one cell releases its dependents in O(degree).
//!
//! # Edge Direction
//!
//! ```text
//! A → B  means  "B waits on A"  (A blocks B)
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use crate::coord::Coord;

/// Blocking-set graph for one batch evaluation.
///
/// Maintains bidirectional adjacency for O(1) lookups:
/// - `preds[B]` = unresolved cells B still waits on (its blocking set)
/// - `succs[A]` = formula cells waiting on A
///
/// # Invariants
///
/// 1. **Bidirectional consistency:** If A ∈ preds[B] then B ∈ succs[A], and vice versa.
/// 2. **No dangling entries:** Empty sets are removed, not stored.
/// 3. **No duplicate edges:** Set semantics enforced by FxHashSet.
#[derive(Default, Debug, Clone)]
pub struct DepGraph {
    /// Blocking sets: for each blocked formula cell B, the cells A it waits on.
    /// B -> {A1, A2, ...}
    preds: FxHashMap<Coord, FxHashSet<Coord>>,

    /// Reverse adjacency: for each awaited cell A, the formulas B waiting on it.
    /// A -> {B1, B2, ...}
    succs: FxHashMap<Coord, FxHashSet<Coord>>,
}

impl DepGraph {
    /// Create an empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this cell is still waiting on at least one reference.
    pub fn is_blocked(&self, cell: Coord) -> bool {
        self.preds.contains_key(&cell)
    }

    /// Returns the number of formula cells still blocked.
    pub fn blocked_count(&self) -> usize {
        self.preds.len()
    }

    /// All blocked formula cells, sorted row-major for deterministic output.
    pub fn blocked_cells(&self) -> Vec<Coord> {
        let mut cells: Vec<Coord> = self.preds.keys().copied().collect();
        cells.sort();
        cells
    }

    /// The cells this formula still waits on, sorted row-major.
    pub fn blocking_set(&self, cell: Coord) -> Vec<Coord> {
        let mut refs: Vec<Coord> = self
            .preds
            .get(&cell)
            .into_iter()
            .flat_map(|s| s.iter().copied())
            .collect();
        refs.sort();
        refs
    }

    /// Register a formula cell blocked on `refs`.
    ///
    /// A formula with no references is never blocked; passing an empty set
    /// stores nothing (invariant: no empty sets).
    pub fn add_formula(&mut self, cell: Coord, refs: FxHashSet<Coord>) {
        if refs.is_empty() {
            return;
        }
        for target in &refs {
            self.succs.entry(*target).or_default().insert(cell);
        }
        self.preds.insert(cell, refs);
    }

    /// Record that `cell` now has a value and release its dependents.
    ///
    /// Removes `cell` from every blocking set that contains it. Returns the
    /// formula cells whose blocking set just drained, sorted row-major so the
    /// caller schedules them deterministically.
    pub fn mark_resolved(&mut self, cell: Coord) -> Vec<Coord> {
        let Some(waiters) = self.succs.remove(&cell) else {
            return Vec::new();
        };

        let mut released = Vec::new();
        for waiter in waiters {
            if let Some(blocking) = self.preds.get_mut(&waiter) {
                blocking.remove(&cell);
                // Clean up empty entries (invariant: no dangling)
                if blocking.is_empty() {
                    self.preds.remove(&waiter);
                    released.push(waiter);
                }
            }
        }

        released.sort();
        released
    }

    // =========================================================================
    // Cycle Groups (Tarjan's SCC)
    // =========================================================================

    /// Find all non-trivial SCCs among the blocked cells (cycle groups).
    ///
    /// Each inner Vec is one SCC (size > 1, or size == 1 with self-loop),
    /// sorted row-major. Only edges between blocked cells count; an edge into
    /// a cell outside the residual graph cannot close a cycle.
    ///
    /// Iterative to avoid stack overflow on deep graphs. Roots and neighbours
    /// are visited in sorted order so the output is deterministic.
    pub fn find_cycle_sccs(&self) -> Vec<Vec<Coord>> {
        let blocked: FxHashSet<Coord> = self.preds.keys().copied().collect();
        if blocked.is_empty() {
            return Vec::new();
        }

        let mut sorted_cells: Vec<Coord> = blocked.iter().copied().collect();
        sorted_cells.sort();

        // Tarjan's state
        let mut index_counter: u32 = 0;
        let mut stack: Vec<Coord> = Vec::new();
        let mut on_stack: FxHashSet<Coord> = FxHashSet::default();
        let mut indices: FxHashMap<Coord, u32> = FxHashMap::default();
        let mut lowlinks: FxHashMap<Coord, u32> = FxHashMap::default();
        let mut sccs: Vec<Vec<Coord>> = Vec::new();

        // Edge direction: from cell X, follow preds[X] (the cells X waits on).
        let sorted_neighbours = |cell: Coord| -> Vec<Coord> {
            let mut neighbours: Vec<Coord> = self
                .preds
                .get(&cell)
                .into_iter()
                .flat_map(|s| s.iter().copied())
                .filter(|c| blocked.contains(c))
                .collect();
            neighbours.sort();
            neighbours
        };

        struct DfsFrame {
            cell: Coord,
            neighbours: Vec<Coord>,
            next_idx: usize,
        }

        for &root in &sorted_cells {
            if indices.contains_key(&root) {
                continue;
            }

            let mut dfs_stack: Vec<DfsFrame> = Vec::new();

            let idx = index_counter;
            index_counter += 1;
            indices.insert(root, idx);
            lowlinks.insert(root, idx);
            stack.push(root);
            on_stack.insert(root);

            dfs_stack.push(DfsFrame {
                cell: root,
                neighbours: sorted_neighbours(root),
                next_idx: 0,
            });

            while let Some(frame) = dfs_stack.last_mut() {
                if frame.next_idx < frame.neighbours.len() {
                    let w = frame.neighbours[frame.next_idx];
                    frame.next_idx += 1;

                    if !indices.contains_key(&w) {
                        // Recurse into w
                        let w_idx = index_counter;
                        index_counter += 1;
                        indices.insert(w, w_idx);
                        lowlinks.insert(w, w_idx);
                        stack.push(w);
                        on_stack.insert(w);

                        dfs_stack.push(DfsFrame {
                            cell: w,
                            neighbours: sorted_neighbours(w),
                            next_idx: 0,
                        });
                    } else if on_stack.contains(&w) {
                        let w_idx = indices[&w];
                        if let Some(v_low) = lowlinks.get_mut(&frame.cell) {
                            if w_idx < *v_low {
                                *v_low = w_idx;
                            }
                        }
                    }
                } else {
                    // All neighbours explored — pop and propagate lowlink
                    let Some(finished) = dfs_stack.pop() else {
                        break;
                    };
                    let v = finished.cell;
                    let v_low = lowlinks[&v];
                    let v_idx = indices[&v];

                    if let Some(parent) = dfs_stack.last() {
                        if let Some(parent_low) = lowlinks.get_mut(&parent.cell) {
                            if v_low < *parent_low {
                                *parent_low = v_low;
                            }
                        }
                    }

                    // SCC root check
                    if v_low == v_idx {
                        let mut scc = Vec::new();
                        while let Some(w) = stack.pop() {
                            on_stack.remove(&w);
                            scc.push(w);
                            if w == v {
                                break;
                            }
                        }

                        let is_cycle = if scc.len() > 1 {
                            true
                        } else {
                            // size == 1: only a cycle if self-loop
                            scc.first().map_or(false, |cell| {
                                self.preds.get(cell).map_or(false, |p| p.contains(cell))
                            })
                        };

                        if is_cycle {
                            scc.sort();
                            sccs.push(scc);
                        }
                    }
                }
            }
        }

        sccs
    }

    /// Check all invariants. Panics if any are violated.
    ///
    /// Only available in test builds.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        // Invariant 1: Bidirectional consistency (preds → succs)
        for (formula_cell, blocking) in &self.preds {
            for target in blocking {
                assert!(
                    self.succs
                        .get(target)
                        .map_or(false, |s| s.contains(formula_cell)),
                    "Missing succ edge: {:?} should have {:?} in waiters",
                    target,
                    formula_cell
                );
            }
        }

        // Invariant 1: Bidirectional consistency (succs → preds)
        for (cell, waiters) in &self.succs {
            for waiter in waiters {
                assert!(
                    self.preds.get(waiter).map_or(false, |s| s.contains(cell)),
                    "Missing pred edge: {:?} should have {:?} in blocking set",
                    waiter,
                    cell
                );
            }
        }

        // Invariant 2: No empty sets stored
        for (cell, blocking) in &self.preds {
            assert!(!blocking.is_empty(), "Empty blocking set stored for {:?}", cell);
        }
        for (cell, waiters) in &self.succs {
            assert!(!waiters.is_empty(), "Empty waiter set stored for {:?}", cell);
        }
    }
}
