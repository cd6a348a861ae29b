//! Report tables
//!
//! A [`ReportTable`] is the in-memory result of one reporting operation: a
//! fixed, named column set and zero or more rows of [`Value`] cells. Tables
//! are never absent; "no data" is a table with its columns and no rows.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{DashError, Result};

/// Column contracts for every report kind.
///
/// Presentation code keys on these names; treat them as a stable interface.
pub mod columns {
    pub const TOTAL_SALES: &[&str] = &["total_sales", "total_value", "average_value"];

    pub const SALES_BY_MODEL: &[&str] = &["model", "quantity", "total_value", "average_value"];

    /// Month breakdown across all years
    pub const SALES_BY_MONTH: &[&str] = &[
        "year",
        "month_number",
        "month_name",
        "quantity",
        "total_value",
    ];

    /// Month breakdown restricted to a single year
    pub const SALES_BY_MONTH_IN_YEAR: &[&str] =
        &["month_number", "month_name", "quantity", "total_value"];

    pub const SALES_BY_DEALERSHIP: &[&str] = &[
        "dealership",
        "city",
        "state",
        "quantity",
        "total_value",
        "average_value",
    ];

    pub const SALES_BY_SALESPERSON: &[&str] = &[
        "salesperson",
        "dealership",
        "quantity",
        "total_value",
        "average_value",
    ];

    /// Row-level sales listing (recent sales and sales in a period)
    pub const SALE_LISTING: &[&str] = &[
        "timestamp",
        "model",
        "dealership",
        "salesperson",
        "customer",
        "paid_amount",
    ];

    pub const DAILY_TREND: &[&str] = &["date", "total_value", "quantity"];

    /// Columns holding money
    pub const MONETARY: &[&str] = &["total_value", "average_value", "paid_amount"];

    /// Columns holding counts of sales
    pub const COUNTS: &[&str] = &["total_sales", "quantity"];

    /// Percentage column appended by [`crate::share_of_total`]
    pub const SHARE: &str = "share";
}

/// A single cell of a report table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric cells as a decimal. Floats are not converted.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(v) => Some(*v),
            Value::Timestamp(v) => Some(v.date()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            // decimals serialize as strings
            Value::Decimal(v) => Serialize::serialize(v, serializer),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Date(_) | Value::Timestamp(_) => serializer.collect_str(self),
        }
    }
}

/// Fixed-column tabular result of one reporting operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ReportTable {
    /// A table with the given columns and no rows.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A zero-row table carrying a report's column contract.
    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().copied())
    }

    /// Assemble a table from rows already known to match `columns` in width.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// Append a row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DashError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows (it may still have columns).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the column names match `expected` exactly, in order.
    pub fn has_columns(&self, expected: &[&str]) -> bool {
        self.columns.len() == expected.len()
            && self.columns.iter().zip(expected).all(|(a, b)| a == b)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(move |r| r.get(idx)))
    }

    /// The first `n` rows, keeping the column set.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Pretty JSON as an array of `{column: value}` records.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DashError::json("report table", e))
    }
}

struct Record<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for ReportTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn model_table() -> ReportTable {
        let mut table = ReportTable::with_columns(columns::SALES_BY_MODEL);
        table
            .push_row(vec![
                Value::Text("Civic".into()),
                Value::Int(2),
                Value::Decimal(dec("102000.00")),
                Value::Decimal(dec("51000.00")),
            ])
            .unwrap();
        table
            .push_row(vec![
                Value::Text("Corolla".into()),
                Value::Int(1),
                Value::Decimal(dec("45000.00")),
                Value::Decimal(dec("45000.00")),
            ])
            .unwrap();
        table
    }

    #[test]
    fn empty_table_keeps_columns() {
        let table = ReportTable::with_columns(columns::SALE_LISTING);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.has_columns(columns::SALE_LISTING));

        let bare = ReportTable::empty();
        assert!(bare.is_empty());
        assert!(bare.columns().is_empty());
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut table = ReportTable::with_columns(columns::TOTAL_SALES);
        let err = table.push_row(vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            DashError::RowWidth {
                expected: 3,
                found: 1
            }
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_by_column_name() {
        let table = model_table();
        assert_eq!(
            table.value(0, "model").and_then(Value::as_str),
            Some("Civic")
        );
        assert_eq!(table.value(1, "quantity").and_then(Value::as_i64), Some(1));
        assert_eq!(table.value(2, "model"), None);
        assert!(table.value(0, "missing").is_none());

        let total: i64 = table
            .column("quantity")
            .unwrap()
            .filter_map(Value::as_i64)
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn head_truncates_rows_only() {
        let table = model_table();
        let top = table.head(1);
        assert_eq!(top.len(), 1);
        assert!(top.has_columns(columns::SALES_BY_MODEL));
        assert_eq!(table.head(10).len(), 2);
    }

    #[test]
    fn serializes_as_records() {
        let json = serde_json::to_value(model_table()).unwrap();
        assert_eq!(json[0]["model"], "Civic");
        assert_eq!(json[0]["quantity"], 2);
        assert_eq!(json[0]["total_value"], "102000.00");
        assert_eq!(json[1]["model"], "Corolla");
    }

    #[test]
    fn decimal_cells_serialize_as_exact_strings() {
        let cell = Value::Decimal(dec("147000.30"));
        assert_eq!(serde_json::to_string(&cell).unwrap(), r#""147000.30""#);

        let pretty = model_table().to_json_pretty().unwrap();
        assert!(pretty.contains(r#""average_value": "51000.00""#));
    }

    #[test]
    fn timestamp_and_null_serialization() {
        let mut table = ReportTable::new(["timestamp", "paid_amount"]);
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        table
            .push_row(vec![Value::Timestamp(ts), Value::Null])
            .unwrap();

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["timestamp"], "2024-01-15T10:30:00");
        assert!(json[0]["paid_amount"].is_null());
    }
}
