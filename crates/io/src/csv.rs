// CSV grid import/export

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use gridcalc_engine::cell::{Cell, Resolved};
use gridcalc_engine::grid::Grid;

use crate::error::IoError;

/// Read a grid from headerless CSV.
///
/// Every field goes through `Cell::from_input`: blank fields become empty
/// cells, numeric fields become literals, everything else (formulas
/// included) stays text. Unlike JSON, CSV has no string/number distinction,
/// so a field `2.5` is a number here where the JSON string `"2.5"` is text.
pub fn import(path: &Path) -> Result<Grid<Cell>, IoError> {
    let file = File::open(path)?;
    import_from_reader(file)
}

pub fn import_from_reader(reader: impl Read) -> Result<Grid<Cell>, IoError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_input).collect());
    }

    // Ragged rows are rejected here with row numbers, not by the csv reader
    Ok(Grid::from_rows(rows)?)
}

/// Write a resolved grid as headerless CSV, one record per row.
/// Empty cells become empty fields.
pub fn export(grid: &Grid<Resolved>, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    export_to_writer(grid, file)
}

pub fn export_to_writer(grid: &Grid<Resolved>, writer: impl Write) -> Result<(), IoError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);

    for row in grid.row_slices() {
        let record: Vec<String> = row.iter().map(|value| field_of(*value)).collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn field_of(value: Resolved) -> String {
    match value {
        Some(n) => n.to_string(),
        None => String::new(),
    }
}
