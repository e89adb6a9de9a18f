//! Conversion of raw rows into typed records under a finalized schema.
//!
//! Conversion is a pure function of `(row, schema, formats)` and always yields
//! exactly one value per schema column. A row shorter than the schema yields
//! [`TypedValue::Null`] for its missing trailing columns; cells past the schema
//! width are dropped. Any non-empty cell that cannot be coerced into its column
//! type is a [`ConversionError`] and is never turned into a silent null.

use crate::cell::{RawCell, RawRow};
use crate::format::{CellFormats, parse_bool_token};
use crate::schema::{ColumnType, Schema};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A typed cell value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedValue {
    Null,
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl TypedValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            TypedValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            TypedValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("NULL"),
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Integer(i) => write!(f, "{i}"),
            TypedValue::Decimal(d) => write!(f, "{d}"),
            TypedValue::Boolean(b) => write!(f, "{b}"),
            TypedValue::Date(d) => write!(f, "{d}"),
            TypedValue::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// One converted row: a value per schema column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedRecord {
    values: Vec<TypedValue>,
}

impl TypedRecord {
    #[must_use]
    pub fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, column: usize) -> Option<&TypedValue> {
        self.values.get(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<TypedValue> {
        self.values
    }

    /// Replace the contents with `values`, keeping the current allocation.
    pub fn fill_from(&mut self, values: impl IntoIterator<Item = TypedValue>) {
        self.values.clear();
        self.values.extend(values);
    }
}

impl Index<usize> for TypedRecord {
    type Output = TypedValue;

    fn index(&self, column: usize) -> &TypedValue {
        &self.values[column]
    }
}

impl From<Vec<TypedValue>> for TypedRecord {
    fn from(values: Vec<TypedValue>) -> Self {
        Self::new(values)
    }
}

/// A non-empty cell that could not be coerced into its column type.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("column {column}: cannot convert {kind} cell {raw} to {target}")]
pub struct ConversionError {
    pub column: usize,
    pub raw: RawCell,
    pub target: ColumnType,
    kind: &'static str,
}

impl ConversionError {
    #[must_use]
    pub fn new(column: usize, raw: RawCell, target: ColumnType) -> Self {
        let kind = raw.kind();
        Self {
            column,
            raw,
            target,
            kind,
        }
    }
}

/// Converts raw rows into [`TypedRecord`]s using a fixed set of [`CellFormats`].
#[derive(Clone, Debug, Default)]
pub struct RowConverter {
    formats: CellFormats,
}

impl RowConverter {
    #[must_use]
    pub fn new(formats: CellFormats) -> Self {
        Self { formats }
    }

    #[must_use]
    pub fn formats(&self) -> &CellFormats {
        &self.formats
    }

    /// Convert `row` into a record with one value per column of `schema`.
    ///
    /// Missing trailing cells become [`TypedValue::Null`] and cells beyond the
    /// schema's width are dropped, so the record is always `schema.len()` wide.
    ///
    /// # Errors
    /// Returns a [`ConversionError`] for the first non-empty cell that cannot be
    /// coerced into its column type.
    pub fn convert(&self, row: &RawRow, schema: &Schema) -> Result<TypedRecord, ConversionError> {
        let mut record = TypedRecord::default();
        self.convert_into(row, schema, &mut record)?;
        Ok(record)
    }

    /// Like [`convert`](Self::convert), but writes into an existing record.
    ///
    /// On error `out` is left holding the columns converted before the failure.
    ///
    /// # Errors
    /// See [`convert`](Self::convert).
    pub fn convert_into(
        &self,
        row: &RawRow,
        schema: &Schema,
        out: &mut TypedRecord,
    ) -> Result<(), ConversionError> {
        out.values.clear();
        out.values.reserve(schema.len());
        for (column, target) in schema.iter().enumerate() {
            let value = match row.cell(column) {
                None => TypedValue::Null,
                Some(cell) => self.convert_cell(column, cell, target)?,
            };
            out.values.push(value);
        }
        Ok(())
    }

    /// Convert a single cell destined for `column` of type `target`.
    ///
    /// # Errors
    /// Returns a [`ConversionError`] when a non-empty cell does not fit `target`.
    pub fn convert_cell(
        &self,
        column: usize,
        cell: &RawCell,
        target: ColumnType,
    ) -> Result<TypedValue, ConversionError> {
        if cell.is_empty() {
            return Ok(TypedValue::Null);
        }
        let fail = || ConversionError::new(column, cell.clone(), target);
        let f = &self.formats;

        let value = match (target, cell) {
            (ColumnType::String | ColumnType::Unknown, c) => TypedValue::String(self.text_of(c)),

            (ColumnType::Integer, RawCell::Number(n)) => {
                TypedValue::Integer(integral(*n).ok_or_else(fail)?)
            }
            (ColumnType::Integer, RawCell::Boolean(b)) => TypedValue::Integer(i64::from(*b)),
            // a textual boolean can only reach a number column through widening
            (ColumnType::Integer, RawCell::String(s)) => TypedValue::Integer(
                f.parse_integer(s)
                    .or_else(|| parse_bool_token(s).map(i64::from))
                    .ok_or_else(fail)?,
            ),

            (ColumnType::Decimal, RawCell::Number(n)) => {
                TypedValue::Decimal(Decimal::from_f64(*n).ok_or_else(fail)?)
            }
            (ColumnType::Decimal, RawCell::Boolean(b)) => {
                TypedValue::Decimal(Decimal::from(i64::from(*b)))
            }
            (ColumnType::Decimal, RawCell::String(s)) => TypedValue::Decimal(
                f.parse_decimal(s)
                    .or_else(|| parse_bool_token(s).map(|b| Decimal::from(i64::from(b))))
                    .ok_or_else(fail)?,
            ),

            (ColumnType::Boolean, RawCell::Boolean(b)) => TypedValue::Boolean(*b),
            (ColumnType::Boolean, RawCell::String(s)) => {
                TypedValue::Boolean(parse_bool_token(s).ok_or_else(fail)?)
            }

            // DATE always drops the time of day, whatever the cell carried.
            (ColumnType::Date, RawCell::DateTime(dt)) => TypedValue::Date(dt.date()),
            (ColumnType::Date, RawCell::String(s)) => {
                TypedValue::Date(f.parse_date(s).ok_or_else(fail)?)
            }

            (ColumnType::DateTime, RawCell::DateTime(dt)) => TypedValue::DateTime(*dt),
            (ColumnType::DateTime, RawCell::String(s)) => {
                TypedValue::DateTime(f.parse_datetime(s).ok_or_else(fail)?)
            }

            _ => return Err(fail()),
        };
        Ok(value)
    }

    /// Textual rendering of a cell for `STRING` columns.
    fn text_of(&self, cell: &RawCell) -> String {
        match cell {
            RawCell::Empty => String::new(),
            RawCell::String(s) => s.clone(),
            RawCell::Number(n) => self.formats.format_number(*n),
            RawCell::Boolean(b) => b.to_string(),
            RawCell::DateTime(dt) => self.formats.format_datetime(*dt),
            RawCell::Error(code) => code.clone(),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&n) {
        Some(n as i64)
    } else {
        None
    }
}
