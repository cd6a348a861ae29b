//! Dashboard shaping over report tables
//!
//! Pure functions that derive chart-ready tables from query results. None of
//! them touch the database.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::format::{format_count, format_currency, MISSING};
use crate::report::{columns, ReportTable, Value};

/// Daily totals from a sales listing (`timestamp`, `paid_amount`).
///
/// Returns `date, total_value, quantity` ordered by date ascending. A listing
/// without those columns yields an empty trend table.
pub fn daily_trend(listing: &ReportTable) -> ReportTable {
    let (Some(ts_idx), Some(paid_idx)) = (
        listing.column_index("timestamp"),
        listing.column_index("paid_amount"),
    ) else {
        return ReportTable::with_columns(columns::DAILY_TREND);
    };

    let mut days: BTreeMap<_, (Decimal, i64)> = BTreeMap::new();
    for row in listing.rows() {
        let Some(date) = row.get(ts_idx).and_then(Value::as_date) else {
            continue;
        };
        let entry = days.entry(date).or_insert((Decimal::ZERO, 0));
        if let Some(paid) = row.get(paid_idx).and_then(Value::as_decimal) {
            entry.0 += paid;
        }
        entry.1 += 1;
    }

    let rows = days
        .into_iter()
        .map(|(date, (total, quantity))| {
            vec![Value::Date(date), Value::Decimal(total), Value::Int(quantity)]
        })
        .collect();
    let names = columns::DAILY_TREND.iter().map(|c| c.to_string()).collect();
    ReportTable::from_parts(names, rows)
}

/// Copy of `table` with a `share` column: each row's percentage of the
/// column total, one decimal place. Rows get `Null` when the total is zero.
pub fn share_of_total(table: &ReportTable, column: &str) -> ReportTable {
    let mut names: Vec<String> = table.columns().to_vec();
    names.push(columns::SHARE.to_string());

    let Some(idx) = table.column_index(column) else {
        return ReportTable::new(names);
    };

    let total: Decimal = table
        .rows()
        .iter()
        .filter_map(|row| row.get(idx).and_then(Value::as_decimal))
        .sum();

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let share = match row.get(idx).and_then(Value::as_decimal) {
                Some(part) if !total.is_zero() => {
                    Value::Decimal((part * Decimal::ONE_HUNDRED / total).round_dp(1))
                }
                _ => Value::Null,
            };
            let mut extended = row.clone();
            extended.push(share);
            extended
        })
        .collect();
    ReportTable::from_parts(names, rows)
}

/// Formatted headline numbers for the dashboard's metric cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineMetrics {
    pub total_sales: String,
    pub total_value: String,
    pub average_value: String,
}

impl HeadlineMetrics {
    /// Build from a `total_sales` report. `None` when the report is empty.
    ///
    /// Over a store with no sales the sum and mean are null: the total shows
    /// as `R$ 0,00` and the average as a placeholder.
    pub fn from_totals(totals: &ReportTable) -> Option<Self> {
        if totals.is_empty() {
            return None;
        }

        let count = totals
            .value(0, "total_sales")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let total = totals
            .value(0, "total_value")
            .and_then(Value::as_decimal)
            .unwrap_or(Decimal::ZERO);
        let average = totals
            .value(0, "average_value")
            .and_then(Value::as_decimal)
            .map(format_currency)
            .unwrap_or_else(|| MISSING.to_string());

        Some(Self {
            total_sales: format_count(count),
            total_value: format_currency(total),
            average_value: average,
        })
    }
}
