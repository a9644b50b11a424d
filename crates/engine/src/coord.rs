//! Cell coordinates and A1-style labels.
//!
//! A `Coord` is a zero-based (row, column) position. On the wire, positions
//! are spelled as labels: column letters in bijective base-26 (A..Z, AA..),
//! then a 1-based row number, e.g. `A1` = (0, 0), `C23` = (22, 2).

use std::fmt;

/// Zero-based grid position. Used as graph nodes in the dependency graph.
///
/// `Ord` is row-major: all of row 0 sorts before row 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
}

impl Coord {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

/// Decode an A1-style label into a coordinate.
///
/// Letters are matched case-insensitively. Returns `None` for anything that
/// is not letters-then-digits, for row 0, and for labels whose row or column
/// number overflows `usize`. Bounds against an actual grid are not checked
/// here; an in-grammar but out-of-grid label decodes fine.
pub fn coordinate_of(label: &str) -> Option<Coord> {
    let mut chars = label.chars().peekable();

    let mut col_str = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            col_str.push(c.to_ascii_uppercase());
            chars.next();
        } else {
            break;
        }
    }
    if col_str.is_empty() {
        return None;
    }

    let row_str: String = chars.collect();
    if row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    // Rows are 1-based on the wire
    let row: usize = row_str.parse().ok()?;
    if row == 0 {
        return None;
    }

    // Bijective base-26: A=1, ..., Z=26, AA=27
    let mut col: usize = 0;
    for c in col_str.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(c as usize - 'A' as usize + 1)?;
    }

    Some(Coord::new(row - 1, col - 1))
}

/// Encode a coordinate as an A1-style label. Pure inverse of `coordinate_of`.
pub fn label_of(coord: Coord) -> String {
    coord.to_string()
}

/// Convert 0-based column index to letter(s): 0=A, 25=Z, 26=AA, etc.
fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}
