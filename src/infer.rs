//! Streaming column type inference.
//!
//! [`TypeInferencer`] keeps one running estimate per column and widens it as rows
//! are observed. It never looks at the source itself; the reader decides how many
//! rows it gets to see (the bounded pre-pass, see [`ReaderConfig::max_infer_rows`]).
//!
//! The bound is a deliberate cost/accuracy tradeoff: a column whose distinguishing
//! values only show up after the last observed row keeps the narrower type, and the
//! converter will then reject those later values with a conversion error instead of
//! the inferencer silently reading more.
//!
//! [`ReaderConfig::max_infer_rows`]: crate::reader::ReaderConfig::max_infer_rows

use crate::cell::{RawCell, RawRow};
use crate::format::CellFormats;
use crate::schema::{ColumnType, Schema};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

#[derive(Clone, Debug)]
pub struct TypeInferencer {
    formats: CellFormats,
    infer_text_cells: bool,
    estimates: Vec<ColumnType>,
    rows_observed: u64,
}

impl TypeInferencer {
    #[must_use]
    pub fn new(formats: CellFormats) -> Self {
        Self {
            formats,
            infer_text_cells: true,
            estimates: Vec::new(),
            rows_observed: 0,
        }
    }

    /// When disabled, string cells always count as `STRING` candidates instead of
    /// being classified by their content.
    #[must_use]
    pub fn with_text_inference(mut self, enabled: bool) -> Self {
        self.infer_text_cells = enabled;
        self
    }

    /// Fold one row into the running estimates.
    pub fn observe(&mut self, row: &RawRow) {
        if row.cells.len() > self.estimates.len() {
            self.estimates.resize(row.cells.len(), ColumnType::Unknown);
        }
        for (column, cell) in row.cells.iter().enumerate() {
            let candidate = self.candidate(cell);
            self.estimates[column] = self.estimates[column].widen(candidate);
        }
        self.rows_observed += 1;
    }

    /// Candidate type of a single cell. Empty cells yield `Unknown` and so leave
    /// the estimate untouched.
    #[must_use]
    pub fn candidate(&self, cell: &RawCell) -> ColumnType {
        match cell {
            c if c.is_empty() => ColumnType::Unknown,
            RawCell::Boolean(_) => ColumnType::Boolean,
            RawCell::Number(n) => number_type(*n),
            RawCell::DateTime(_) if cell.has_time_of_day() => ColumnType::DateTime,
            RawCell::DateTime(_) => ColumnType::Date,
            RawCell::String(s) if self.infer_text_cells => self.formats.classify_text(s),
            RawCell::String(_) | RawCell::Error(_) | RawCell::Empty => ColumnType::String,
        }
    }

    /// Current estimates, `Unknown` included.
    #[must_use]
    pub fn estimates(&self) -> &[ColumnType] {
        &self.estimates
    }

    #[must_use]
    pub fn rows_observed(&self) -> u64 {
        self.rows_observed
    }

    /// Resolve the estimates into a schema. Columns never seen non-empty become
    /// `STRING`.
    #[must_use]
    pub fn finalize(self) -> Schema {
        self.estimates.into_iter().map(ColumnType::resolved).collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_type(n: f64) -> ColumnType {
    if !n.is_finite() {
        // inf/NaN cannot live in a number column
        ColumnType::String
    } else if n.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&n) {
        ColumnType::Integer
    } else if Decimal::from_f64(n).is_some() {
        ColumnType::Decimal
    } else {
        // too large for a decimal column; only its text survives
        ColumnType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ReaderPosition;
    use chrono::NaiveDate;

    fn row(cells: Vec<RawCell>) -> RawRow {
        RawRow::new(ReaderPosition::default(), cells)
    }

    #[test]
    fn integer_widens_to_decimal() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec!["Alice".into(), RawCell::Number(30.0)]));
        inf.observe(&row(vec!["Bob".into(), RawCell::Number(25.5)]));
        assert_eq!(
            inf.finalize().columns(),
            &[ColumnType::String, ColumnType::Decimal]
        );
    }

    #[test]
    fn empty_cells_do_not_change_estimates() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![RawCell::Boolean(true), RawCell::Empty]));
        inf.observe(&row(vec![RawCell::Empty, RawCell::String(String::new())]));
        assert_eq!(inf.estimates(), &[ColumnType::Boolean, ColumnType::Unknown]);
        assert_eq!(
            inf.finalize().columns(),
            &[ColumnType::Boolean, ColumnType::String]
        );
    }

    #[test]
    fn date_cells_split_on_time_of_day() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let midnight = day.and_hms_opt(0, 0, 0).unwrap();
        let afternoon = day.and_hms_opt(13, 45, 0).unwrap();

        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![midnight.into(), midnight.into()]));
        inf.observe(&row(vec![midnight.into(), afternoon.into()]));
        assert_eq!(
            inf.finalize().columns(),
            &[ColumnType::Date, ColumnType::DateTime]
        );
    }

    #[test]
    fn boolean_and_date_conflict_is_string() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![RawCell::Boolean(false)]));
        inf.observe(&row(vec![day.into()]));
        assert_eq!(inf.finalize().columns(), &[ColumnType::String]);
    }

    #[test]
    fn ragged_rows_extend_the_schema() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![RawCell::Number(1.0)]));
        inf.observe(&row(vec![RawCell::Number(2.0), "x".into(), RawCell::Boolean(true)]));
        assert_eq!(inf.rows_observed(), 2);
        assert_eq!(
            inf.finalize().columns(),
            &[ColumnType::Integer, ColumnType::String, ColumnType::Boolean]
        );
    }

    #[test]
    fn text_inference_can_be_disabled() {
        let mut inf = TypeInferencer::new(CellFormats::default()).with_text_inference(false);
        inf.observe(&row(vec!["42".into()]));
        assert_eq!(inf.finalize().columns(), &[ColumnType::String]);

        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec!["42".into()]));
        assert_eq!(inf.finalize().columns(), &[ColumnType::Integer]);
    }

    #[test]
    fn numbers_beyond_decimal_range_are_strings() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![RawCell::Number(1e20), RawCell::Number(1e30)]));
        assert_eq!(
            inf.finalize().columns(),
            &[ColumnType::Decimal, ColumnType::String]
        );
    }

    #[test]
    fn blank_text_does_not_change_estimates() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec!["1".into()]));
        inf.observe(&row(vec![" ".into()]));
        assert_eq!(inf.finalize().columns(), &[ColumnType::Integer]);
    }

    #[test]
    fn error_cells_are_strings() {
        let mut inf = TypeInferencer::new(CellFormats::default());
        inf.observe(&row(vec![RawCell::Number(1.0)]));
        inf.observe(&row(vec![RawCell::Error("#DIV/0!".into())]));
        assert_eq!(inf.finalize().columns(), &[ColumnType::String]);
    }
}
