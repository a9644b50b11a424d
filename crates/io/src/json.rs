// JSON grid import/export

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use gridcalc_engine::cell::{Cell, Resolved};
use gridcalc_engine::grid::Grid;

use crate::error::IoError;

/// Read a grid from a JSON array of row arrays.
///
/// Entries may be numbers, strings, or `null`. Strings are kept verbatim;
/// classifying them as formulas or literals is the evaluator's job, so a
/// JSON string `"2.5"` stays text here.
pub fn import(path: &Path) -> Result<Grid<Cell>, IoError> {
    let file = File::open(path)?;
    import_from_reader(BufReader::new(file))
}

pub fn import_from_reader(reader: impl Read) -> Result<Grid<Cell>, IoError> {
    let rows: Vec<Vec<Cell>> = serde_json::from_reader(reader)?;
    Ok(Grid::from_rows(rows)?)
}

/// Write a resolved grid as a pretty-printed JSON array of arrays.
/// Integers come out without a decimal point, empty cells as `null`.
pub fn export(grid: &Grid<Resolved>, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    export_to_writer(grid, BufWriter::new(file))
}

pub fn export_to_writer(grid: &Grid<Resolved>, writer: impl Write) -> Result<(), IoError> {
    let rows: Vec<&[Resolved]> = grid.row_slices().collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
