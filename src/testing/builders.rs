//! Builders for in-memory workbooks.

use crate::cell::RawCell;
use crate::source::{MemoryOpener, MemorySheet, MemoryWorkbook};
use std::path::PathBuf;

/// A fluent builder for [`MemoryWorkbook`]s.
///
/// Rows are appended to the most recently started sheet; a row added before any
/// [`sheet`](Self::sheet) call starts a sheet named `Sheet1`.
///
/// # Example
///
/// ```
/// use ironsheet::RawCell;
/// use ironsheet::testing::WorkbookBuilder;
///
/// let workbook = WorkbookBuilder::new()
///     .sheet("2023")
///     .row([RawCell::Number(1.0)])
///     .sheet("2024")
///     .rows((2..5).map(|i| vec![RawCell::Number(f64::from(i))]))
///     .build();
///
/// assert_eq!(workbook.sheets.len(), 2);
/// assert_eq!(workbook.row_count(), 4);
/// ```
#[derive(Debug, Default)]
pub struct WorkbookBuilder {
    sheets: Vec<MemorySheet>,
}

impl WorkbookBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Start a new, empty sheet.
    #[must_use]
    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheets.push(MemorySheet::new(name, Vec::new()));
        self
    }

    /// Append one row to the current sheet.
    #[must_use]
    pub fn row(mut self, cells: impl IntoIterator<Item = RawCell>) -> Self {
        self.current().rows.push(cells.into_iter().collect());
        self
    }

    /// Append several rows to the current sheet.
    #[must_use]
    pub fn rows<R>(mut self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = RawCell>,
    {
        let sheet = self.current();
        sheet
            .rows
            .extend(rows.into_iter().map(|r| r.into_iter().collect()));
        self
    }

    #[must_use]
    pub fn build(self) -> MemoryWorkbook {
        MemoryWorkbook::new(self.sheets)
    }

    /// Build and register the workbook under `path` in a fresh [`MemoryOpener`].
    #[must_use]
    pub fn into_opener(self, path: impl Into<PathBuf>) -> MemoryOpener {
        MemoryOpener::new().with_workbook(path, self.build())
    }

    fn current(&mut self) -> &mut MemorySheet {
        if self.sheets.is_empty() {
            self.sheets.push(MemorySheet::new("Sheet1", Vec::new()));
        }
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }
}

/// Single-column rows holding the numbers `start..end`.
///
/// # Example
///
/// ```
/// use ironsheet::testing::number_rows;
///
/// assert_eq!(number_rows(0, 3).len(), 3);
/// ```
#[must_use]
pub fn number_rows(start: i32, end: i32) -> Vec<Vec<RawCell>> {
    (start..end)
        .map(|i| vec![RawCell::Number(f64::from(i))])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_before_any_sheet_go_to_sheet1() {
        let wb = WorkbookBuilder::new().row([RawCell::Empty]).build();
        assert_eq!(wb.sheets.len(), 1);
        assert_eq!(wb.sheets[0].name, "Sheet1");
    }

    #[test]
    fn empty_sheets_are_kept() {
        let wb = WorkbookBuilder::new()
            .sheet("a")
            .sheet("b")
            .rows(number_rows(0, 2))
            .build();
        assert!(wb.sheets[0].rows.is_empty());
        assert_eq!(wb.sheets[1].rows.len(), 2);
    }
}
