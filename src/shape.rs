//! Record shaping strategies.
//!
//! A [`RecordShaper`] turns converted rows into whatever the caller wants to hold.
//! The optional `reuse` argument is an owned buffer handed back by the caller.
//! [`RowShaper`] and [`ArrayShaper`] convert straight into it, so a caller that
//! keeps passing its buffer back never allocates a new record per row.

use crate::cell::RawRow;
use crate::convert::{ConversionError, RowConverter, TypedRecord, TypedValue};
use crate::schema::Schema;

pub trait RecordShaper {
    type Output;

    /// Shape `record`, refilling `reuse` when one is given.
    fn shape(&self, record: TypedRecord, reuse: Option<Self::Output>) -> Self::Output;

    /// Convert `row` under `schema` and shape the result.
    ///
    /// The default converts into a fresh record and hands it to [`shape`](Self::shape).
    ///
    /// # Errors
    /// Returns the [`ConversionError`] of the first cell that does not fit its column.
    fn shape_row(
        &self,
        converter: &RowConverter,
        row: &RawRow,
        schema: &Schema,
        reuse: Option<Self::Output>,
    ) -> Result<Self::Output, ConversionError> {
        let record = converter.convert(row, schema)?;
        Ok(self.shape(record, reuse))
    }
}

/// Row-oriented output: the record itself, refilled in place when reused.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowShaper;

impl RecordShaper for RowShaper {
    type Output = TypedRecord;

    fn shape(&self, record: TypedRecord, reuse: Option<TypedRecord>) -> TypedRecord {
        match reuse {
            Some(mut buf) => {
                buf.fill_from(record.into_values());
                buf
            }
            None => record,
        }
    }

    fn shape_row(
        &self,
        converter: &RowConverter,
        row: &RawRow,
        schema: &Schema,
        reuse: Option<TypedRecord>,
    ) -> Result<TypedRecord, ConversionError> {
        let mut buf = reuse.unwrap_or_default();
        converter.convert_into(row, schema, &mut buf)?;
        Ok(buf)
    }
}

/// Array-oriented output: a bare `Vec` of values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayShaper;

impl RecordShaper for ArrayShaper {
    type Output = Vec<TypedValue>;

    fn shape(&self, record: TypedRecord, reuse: Option<Vec<TypedValue>>) -> Vec<TypedValue> {
        match reuse {
            Some(mut buf) => {
                buf.clear();
                buf.extend(record.into_values());
                buf
            }
            None => record.into_values(),
        }
    }

    fn shape_row(
        &self,
        converter: &RowConverter,
        row: &RawRow,
        schema: &Schema,
        reuse: Option<Vec<TypedValue>>,
    ) -> Result<Vec<TypedValue>, ConversionError> {
        let mut buf = TypedRecord::new(reuse.unwrap_or_default());
        converter.convert_into(row, schema, &mut buf)?;
        Ok(buf.into_values())
    }
}

/// Any `Fn(TypedRecord) -> T` closure shapes records, ignoring reuse buffers.
impl<F, T> RecordShaper for F
where
    F: Fn(TypedRecord) -> T,
{
    type Output = T;

    fn shape(&self, record: TypedRecord, _reuse: Option<T>) -> T {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{RawCell, ReaderPosition};
    use crate::schema::ColumnType;

    fn record() -> TypedRecord {
        TypedRecord::new(vec![TypedValue::Integer(1), TypedValue::Null])
    }

    #[test]
    fn row_shaper_refills_reused_buffer() {
        let buf = TypedRecord::new(vec![TypedValue::Boolean(true); 5]);
        let out = RowShaper.shape(record(), Some(buf));
        assert_eq!(out, record());
    }

    #[test]
    fn row_shaper_converts_into_the_reused_allocation() {
        let row = RawRow::new(ReaderPosition::default(), vec![RawCell::Number(4.0)]);
        let schema = Schema::new(vec![ColumnType::Integer]);
        let buf = TypedRecord::new(Vec::with_capacity(16));
        let before = buf.values().as_ptr();

        let out = RowShaper
            .shape_row(&RowConverter::default(), &row, &schema, Some(buf))
            .unwrap();
        assert_eq!(out.values(), &[TypedValue::Integer(4)]);
        assert_eq!(out.values().as_ptr(), before);
    }

    #[test]
    fn array_shaper_converts_into_the_reused_vec() {
        let row = RawRow::new(ReaderPosition::default(), vec!["x".into()]);
        let buf: Vec<TypedValue> = Vec::with_capacity(16);
        let before = buf.as_ptr();

        let out = ArrayShaper
            .shape_row(&RowConverter::default(), &row, &Schema::all_strings(1), Some(buf))
            .unwrap();
        assert_eq!(out, vec![TypedValue::String("x".into())]);
        assert_eq!(out.as_ptr(), before);
    }

    #[test]
    fn array_shaper_returns_values() {
        assert_eq!(
            ArrayShaper.shape(record(), None),
            vec![TypedValue::Integer(1), TypedValue::Null]
        );
    }

    #[test]
    fn closures_are_shapers() {
        let width = |r: TypedRecord| r.len();
        assert_eq!(width.shape(record(), None), 2);
    }
}
