//! Dense 2D cell container (row-major storage).
//!
//! Dimensions are fixed at construction; evaluation never resizes a grid.

use crate::coord::Coord;
use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Grid<T> {
    /// Grid of the given dimensions with every cell set to `fill`.
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: vec![fill; rows * cols],
            rows,
            cols,
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid from rows, rejecting ragged input. Every row must have
    /// the same number of cells as the first; an empty Vec is a 0x0 grid.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, EvalError> {
        let Some(first) = rows.first() else {
            return Ok(Self {
                data: Vec::new(),
                rows: 0,
                cols: 0,
            });
        };

        let cols = first.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(EvalError::RaggedInput {
                    row: i + 1,
                    expected: cols,
                    found: row.len(),
                });
            }
        }

        let row_count = rows.len();
        let mut flat = Vec::with_capacity(row_count * cols);
        for row in rows {
            flat.extend(row);
        }

        Ok(Self {
            data: flat,
            rows: row_count,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    pub fn get(&self, coord: Coord) -> Option<&T> {
        if self.contains(coord) {
            Some(&self.data[coord.row * self.cols + coord.col])
        } else {
            None
        }
    }

    pub fn set(&mut self, coord: Coord, value: T) {
        if self.contains(coord) {
            self.data[coord.row * self.cols + coord.col] = value;
        }
    }

    /// Row-major iteration over every cell.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        self.data.iter().enumerate().map(|(i, value)| {
            let coord = if self.cols == 0 {
                Coord::new(0, 0)
            } else {
                Coord::new(i / self.cols, i % self.cols)
            };
            (coord, value)
        })
    }

    /// Transform every cell, keeping the shape.
    pub fn map<U>(self, mut f: impl FnMut(Coord, T) -> U) -> Grid<U> {
        let cols = self.cols;
        let data = self
            .data
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let coord = if cols == 0 {
                    Coord::new(0, 0)
                } else {
                    Coord::new(i / cols, i % cols)
                };
                f(coord, value)
            })
            .collect();
        Grid {
            data,
            rows: self.rows,
            cols,
        }
    }

    /// Borrowing row-major view, one slice per row.
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |r| &self.data[r * self.cols..(r + 1) * self.cols])
    }

    /// Consume the grid back into rows.
    pub fn into_rows(self) -> Vec<Vec<T>> {
        let mut out = Vec::with_capacity(self.rows);
        let mut iter = self.data.into_iter();
        for _ in 0..self.rows {
            out.push(iter.by_ref().take(self.cols).collect());
        }
        out
    }
}
