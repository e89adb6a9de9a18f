//! Untyped cell values as they come out of a cell source.
//!
//! A [`RawRow`] is what a [`CellSource`](crate::source::CellSource) yields on each
//! step: the cells of one spreadsheet row plus the [`ReaderPosition`] it was read
//! from. Rows may be ragged; a row shorter than the schema simply has no cells for
//! its trailing columns.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell before typing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawCell {
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    /// A date-formatted cell. A time of day of exactly midnight marks a pure date.
    DateTime(NaiveDateTime),
    /// An error cell, carrying the code the spreadsheet displays (`#DIV/0!`, `#N/A`, ...).
    Error(String),
}

impl RawCell {
    /// `true` for [`RawCell::Empty`] and for strings that are blank after trimming.
    ///
    /// Inference and conversion both go through this, so a blank cell is null in
    /// every column type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// `true` when a date cell carries a time of day other than midnight.
    #[must_use]
    pub fn has_time_of_day(&self) -> bool {
        matches!(self, RawCell::DateTime(dt) if dt.num_seconds_from_midnight() != 0 || dt.nanosecond() != 0)
    }

    /// Short name of the cell kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RawCell::Empty => "empty",
            RawCell::String(_) => "string",
            RawCell::Number(_) => "number",
            RawCell::Boolean(_) => "boolean",
            RawCell::DateTime(_) => "datetime",
            RawCell::Error(_) => "error",
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Empty => f.write_str("<empty>"),
            RawCell::String(s) => write!(f, "{s:?}"),
            RawCell::Number(n) => write!(f, "{n}"),
            RawCell::Boolean(b) => write!(f, "{b}"),
            RawCell::DateTime(dt) => write!(f, "{dt}"),
            RawCell::Error(code) => f.write_str(code),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::String(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        RawCell::String(s)
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<i64> for RawCell {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        RawCell::Number(n as f64)
    }
}

impl From<bool> for RawCell {
    fn from(b: bool) -> Self {
        RawCell::Boolean(b)
    }
}

impl From<NaiveDateTime> for RawCell {
    fn from(dt: NaiveDateTime) -> Self {
        RawCell::DateTime(dt)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawCell::Empty, Into::into)
    }
}

/// Location of a row inside a split: sheet index plus row index within that sheet.
///
/// Used both as the origin of a [`RawRow`] and as the "next row to read" cursor of
/// a source. Ordering is lexicographic, so positions compare in reading order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ReaderPosition {
    pub sheet_index: u64,
    pub row_index: u64,
}

impl ReaderPosition {
    #[must_use]
    pub const fn new(sheet_index: u64, row_index: u64) -> Self {
        Self {
            sheet_index,
            row_index,
        }
    }

    /// The first row of the following sheet.
    #[must_use]
    pub const fn next_sheet(self) -> Self {
        Self::new(self.sheet_index + 1, 0)
    }

    /// The following row of the same sheet.
    #[must_use]
    pub const fn next_row(self) -> Self {
        Self::new(self.sheet_index, self.row_index + 1)
    }
}

impl fmt::Display for ReaderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet {} row {}", self.sheet_index, self.row_index)
    }
}

/// One row of cells plus the position it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub origin: ReaderPosition,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    #[must_use]
    pub fn new(origin: ReaderPosition, cells: Vec<RawCell>) -> Self {
        Self { origin, cells }
    }

    /// The cell at `column`, or `None` past the end of a short row.
    #[must_use]
    pub fn cell(&self, column: usize) -> Option<&RawCell> {
        self.cells.get(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
