//! Column types and the finalized per-split schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Primitive type of one column.
///
/// `Unknown` only exists while inferring: it means no observed cell has
/// constrained the column yet. A finalized [`Schema`] never contains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Unknown,
}

impl ColumnType {
    /// Narrowest type both `self` and `other` convert into.
    ///
    /// `Unknown` is the identity. Defined widenings follow the chain
    /// `Boolean -> Integer -> Decimal` and `Date -> DateTime`; every other pair of
    /// distinct types (numbers vs dates, booleans vs dates, anything vs strings)
    /// resolves to `String`.
    #[must_use]
    pub fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::{Boolean, Date, DateTime, Decimal, Integer, String, Unknown};
        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, t) | (t, Unknown) => t,
            (Boolean, Integer) | (Integer, Boolean) => Integer,
            (Boolean | Integer, Decimal) | (Decimal, Boolean | Integer) => Decimal,
            (Date, DateTime) | (DateTime, Date) => DateTime,
            _ => String,
        }
    }

    /// `Unknown` resolves to `String`; everything else is already final.
    #[must_use]
    pub fn resolved(self) -> ColumnType {
        match self {
            ColumnType::Unknown => ColumnType::String,
            t => t,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Integer => "INTEGER",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered column types of a split, indexed densely from 0.
///
/// A schema is built once, either by [`TypeInferencer::finalize`](crate::infer::TypeInferencer::finalize)
/// or supplied by the caller, and is never mutated afterward.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnType>,
}

impl Schema {
    #[must_use]
    pub fn new(columns: Vec<ColumnType>) -> Self {
        Self { columns }
    }

    /// A schema of `width` string columns.
    #[must_use]
    pub fn all_strings(width: usize) -> Self {
        Self::new(vec![ColumnType::String; width])
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnType] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn get(&self, column: usize) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.columns.iter().copied()
    }
}

impl Index<usize> for Schema {
    type Output = ColumnType;

    fn index(&self, column: usize) -> &ColumnType {
        &self.columns[column]
    }
}

impl From<Vec<ColumnType>> for Schema {
    fn from(columns: Vec<ColumnType>) -> Self {
        Self::new(columns)
    }
}

impl FromIterator<ColumnType> for Schema {
    fn from_iter<I: IntoIterator<Item = ColumnType>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, t) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{t}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnType::*;
    use super::*;

    #[test]
    fn widen_numeric_chain() {
        assert_eq!(Integer.widen(Decimal), Decimal);
        assert_eq!(Boolean.widen(Integer), Integer);
        assert_eq!(Decimal.widen(Boolean), Decimal);
    }

    #[test]
    fn widen_dates() {
        assert_eq!(Date.widen(DateTime), DateTime);
        assert_eq!(DateTime.widen(Date), DateTime);
    }

    #[test]
    fn widen_without_common_type_falls_back_to_string() {
        assert_eq!(Boolean.widen(Date), String);
        assert_eq!(Decimal.widen(DateTime), String);
        assert_eq!(String.widen(Integer), String);
    }

    #[test]
    fn unknown_is_identity() {
        for t in [String, Integer, Decimal, Boolean, Date, DateTime, Unknown] {
            assert_eq!(Unknown.widen(t), t);
            assert_eq!(t.widen(Unknown), t);
        }
        assert_eq!(Unknown.resolved(), String);
    }

    #[test]
    fn display_lists_columns() {
        let schema = Schema::new(vec![String, Decimal]);
        assert_eq!(schema.to_string(), "[STRING, DECIMAL]");
    }
}
