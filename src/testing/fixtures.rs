//! Pre-built workbooks for common reading scenarios.

use crate::cell::RawCell;
use crate::source::MemoryWorkbook;
use crate::testing::builders::{WorkbookBuilder, number_rows};
use chrono::{NaiveDate, NaiveDateTime};

/// Two rows of (name, age), with a fractional age in the second row.
///
/// Infers as `[STRING, DECIMAL]`.
///
/// ```
/// use ironsheet::testing::people_workbook;
///
/// assert_eq!(people_workbook().row_count(), 2);
/// ```
#[must_use]
pub fn people_workbook() -> MemoryWorkbook {
    WorkbookBuilder::new()
        .sheet("people")
        .row(["Alice".into(), RawCell::Number(30.0)])
        .row(["Bob".into(), RawCell::Number(25.5)])
        .build()
}

/// [`people_workbook`] with a `name,age` header row on top.
#[must_use]
pub fn people_with_header_workbook() -> MemoryWorkbook {
    WorkbookBuilder::new()
        .sheet("people")
        .row(["name".into(), "age".into()])
        .row(["Alice".into(), RawCell::Number(30.0)])
        .row(["Bob".into(), RawCell::Number(25.5)])
        .build()
}

/// Three sheets, the middle one empty: 3 rows, nothing, 2 rows of integers.
#[must_use]
pub fn multi_sheet_workbook() -> MemoryWorkbook {
    WorkbookBuilder::new()
        .sheet("2023")
        .rows(number_rows(1, 4))
        .sheet("notes")
        .sheet("2024")
        .rows(number_rows(10, 12))
        .build()
}

/// `clean_rows` integer rows followed by one text row in the same column.
///
/// With an inference bound of at most `clean_rows` the column infers as
/// `INTEGER` and the last row fails to convert.
#[must_use]
pub fn late_text_workbook(clean_rows: i32) -> MemoryWorkbook {
    WorkbookBuilder::new()
        .sheet("data")
        .rows(number_rows(0, clean_rows))
        .row(["n/a".into()])
        .build()
}

/// Date cells at midnight next to date-time cells with a time of day.
///
/// Infers as `[DATE, DATETIME]`.
#[must_use]
pub fn dates_workbook() -> MemoryWorkbook {
    let at = |d: u32, h: u32| -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .and_then(|date| date.and_hms_opt(h, 30, 0))
            .unwrap_or_default()
    };
    let midnight = |d: u32| -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    };
    WorkbookBuilder::new()
        .sheet("log")
        .row([midnight(1).into(), at(1, 9).into()])
        .row([midnight(2).into(), at(2, 17).into()])
        .build()
}
