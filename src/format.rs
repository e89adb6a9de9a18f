//! Textual formatting and parsing rules for cells.
//!
//! [`CellFormats`] bundles the decimal, date and datetime conventions of a source.
//! The same rules are used in both directions: to render numeric/boolean/date
//! cells as text for `STRING` columns, and to parse string cells into typed
//! values (and, during inference, to classify them).

use crate::schema::ColumnType;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default chrono pattern for dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Default chrono pattern for datetimes.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separators used when reading and writing decimal numbers as text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalFormat {
    pub decimal_separator: char,
    /// Thousands separator accepted (and ignored) while parsing. Never emitted.
    pub grouping_separator: Option<char>,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: None,
        }
    }
}

impl DecimalFormat {
    /// Comma decimals with dot grouping, as in most continental European locales.
    #[must_use]
    pub fn european() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: Some('.'),
        }
    }

    /// Parse `text` into a decimal. Leading/trailing whitespace is ignored.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut normalized = String::with_capacity(text.len());
        for c in text.chars() {
            if Some(c) == self.grouping_separator {
                continue;
            }
            if c == self.decimal_separator {
                normalized.push('.');
            } else if c == '.' || c == ',' {
                // a separator this format does not use
                return None;
            } else {
                normalized.push(c);
            }
        }
        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .ok()
    }

    /// Render a decimal with this format's decimal separator and no grouping.
    #[must_use]
    pub fn format(&self, value: Decimal) -> String {
        let text = value.normalize().to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }

    /// `true` when `text` spells a fractional number (contains the decimal separator).
    fn is_fractional_literal(&self, text: &str) -> bool {
        text.contains(self.decimal_separator)
            || text.contains('e')
            || text.contains('E')
    }
}

/// All textual conventions of a source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFormats {
    pub decimal: DecimalFormat,
    /// chrono pattern for date-only values.
    pub date_format: String,
    /// chrono pattern for date-with-time values.
    pub datetime_format: String,
}

impl Default for CellFormats {
    fn default() -> Self {
        Self {
            decimal: DecimalFormat::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

impl CellFormats {
    #[must_use]
    pub fn with_decimal(mut self, decimal: DecimalFormat) -> Self {
        self.decimal = decimal;
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    #[must_use]
    pub fn with_datetime_format(mut self, pattern: impl Into<String>) -> Self {
        self.datetime_format = pattern.into();
        self
    }

    #[must_use]
    pub fn parse_decimal(&self, text: &str) -> Option<Decimal> {
        self.decimal.parse(text)
    }

    /// Parse an integral number. `"30"` and `"30.0"` both parse; `"30.5"` does not.
    #[must_use]
    pub fn parse_integer(&self, text: &str) -> Option<i64> {
        let d = self.decimal.parse(text)?;
        if d.fract().is_zero() { d.to_i64() } else { None }
    }

    /// Parse a date with the date pattern, falling back to the datetime pattern
    /// and dropping its time of day.
    #[must_use]
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        NaiveDate::parse_from_str(text, &self.date_format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, &self.datetime_format)
                    .ok()
                    .map(|dt| dt.date())
            })
    }

    /// Parse a datetime with the datetime pattern, falling back to the date
    /// pattern at midnight.
    #[must_use]
    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        NaiveDateTime::parse_from_str(text, &self.datetime_format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.date_format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    #[must_use]
    pub fn format_number(&self, n: f64) -> String {
        match Decimal::from_f64(n) {
            Some(d) => self.decimal.format(d),
            None => n.to_string(),
        }
    }

    #[must_use]
    pub fn format_decimal(&self, d: Decimal) -> String {
        self.decimal.format(d)
    }

    #[must_use]
    pub fn format_date(&self, d: NaiveDate) -> String {
        d.format(&self.date_format).to_string()
    }

    /// Midnight values render with the date pattern, anything else with the
    /// datetime pattern.
    #[must_use]
    pub fn format_datetime(&self, dt: NaiveDateTime) -> String {
        if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
            self.format_date(dt.date())
        } else {
            dt.format(&self.datetime_format).to_string()
        }
    }

    /// Classify a string cell for inference.
    ///
    /// Order matters: booleans first, then numbers, then datetimes before dates so a
    /// value carrying a time is never mistaken for a plain date.
    #[must_use]
    pub fn classify_text(&self, text: &str) -> ColumnType {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ColumnType::Unknown;
        }
        if parse_bool_token(trimmed).is_some() {
            return ColumnType::Boolean;
        }
        if let Some(d) = self.decimal.parse(trimmed) {
            return if self.decimal.is_fractional_literal(trimmed) || d.to_i64().is_none() {
                ColumnType::Decimal
            } else {
                ColumnType::Integer
            };
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, &self.datetime_format) {
            return if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                ColumnType::Date
            } else {
                ColumnType::DateTime
            };
        }
        if NaiveDate::parse_from_str(trimmed, &self.date_format).is_ok() {
            return ColumnType::Date;
        }
        ColumnType::String
    }
}

/// Recognized textual boolean tokens: `true`/`false`, case-insensitive.
#[must_use]
pub fn parse_bool_token(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parse_decimal_with_grouping() {
        let fmt = DecimalFormat::european();
        assert_eq!(fmt.parse("1.234,5"), Some(Decimal::new(12345, 1)));
        assert_eq!(fmt.parse("12,5"), Some(Decimal::new(125, 1)));
        assert_eq!(DecimalFormat::default().parse("12,5"), None);
    }

    #[test]
    fn format_number_drops_trailing_zeroes() {
        let formats = CellFormats::default();
        assert_eq!(formats.format_number(30.0), "30");
        assert_eq!(formats.format_number(25.5), "25.5");
        let eu = CellFormats::default().with_decimal(DecimalFormat::european());
        assert_eq!(eu.format_number(25.5), "25,5");
    }

    #[test]
    fn classify_text_cells() {
        let formats = CellFormats::default();
        assert_eq!(formats.classify_text("TRUE"), ColumnType::Boolean);
        assert_eq!(formats.classify_text("42"), ColumnType::Integer);
        assert_eq!(formats.classify_text("42.0"), ColumnType::Decimal);
        assert_eq!(formats.classify_text("2020-01-01"), ColumnType::Date);
        assert_eq!(formats.classify_text("2020-01-01 13:45:00"), ColumnType::DateTime);
        assert_eq!(formats.classify_text("2020-01-01 00:00:00"), ColumnType::Date);
        assert_eq!(formats.classify_text("Alice"), ColumnType::String);
        assert_eq!(formats.classify_text("  "), ColumnType::Unknown);
    }

    #[test]
    fn parse_integer_rejects_fractions() {
        let formats = CellFormats::default();
        assert_eq!(formats.parse_integer("30"), Some(30));
        assert_eq!(formats.parse_integer("30.0"), Some(30));
        assert_eq!(formats.parse_integer("30.5"), None);
    }

    #[test]
    fn date_parsing_falls_back_across_patterns() {
        let formats = CellFormats::default();
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(formats.parse_date("2020-01-01 13:45:00"), Some(d));
        assert_eq!(
            formats.parse_datetime("2020-01-01"),
            d.and_hms_opt(0, 0, 0)
        );
    }
}
