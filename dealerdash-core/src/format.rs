//! Brazilian-Portuguese display formatting
//!
//! Thousands are grouped with `.`, decimals separated with `,`, and money is
//! prefixed with `R$`: `1234567.8` renders as `R$ 1.234.567,80`. Rounding is
//! half away from zero at the requested number of places.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::report::{columns, Value};

/// Placeholder for cells with no value
pub const MISSING: &str = "-";

/// `R$ 1.234.567,80`
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_decimal(value, 2))
}

/// Group thousands with `.` and use `,` before `places` fraction digits.
pub fn format_decimal(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", places as usize, rounded.abs());

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// `1.234.567`
pub fn format_count(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `15/01/2024 10:30`
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format("%d/%m/%Y %H:%M").to_string()
}

/// `15/01/2024`
pub fn format_date(value: NaiveDate) -> String {
    value.format("%d/%m/%Y").to_string()
}

/// Render one report cell for display, using the column name to pick the
/// convention (money, counts, percentages, plain).
pub fn format_cell(column: &str, value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::Decimal(v) if columns::MONETARY.contains(&column) => format_currency(*v),
        Value::Int(v) if columns::MONETARY.contains(&column) => format_currency(Decimal::from(*v)),
        Value::Decimal(v) if column == columns::SHARE => format!("{}%", format_decimal(*v, 1)),
        Value::Decimal(v) => format_decimal(*v, 2),
        Value::Int(v) if columns::COUNTS.contains(&column) => format_count(*v),
        Value::Timestamp(v) => format_timestamp(*v),
        Value::Date(v) => format_date(*v),
        other => other.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn currency_groups_thousands_with_decimal_comma() {
        assert_eq!(format_currency(dec("1234567.8")), "R$ 1.234.567,80");
        assert_eq!(format_currency(dec("50000")), "R$ 50.000,00");
        assert_eq!(format_currency(dec("999.99")), "R$ 999,99");
        assert_eq!(format_currency(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(dec("999.995")), "R$ 1.000,00");
        assert_eq!(format_currency(dec("0.004")), "R$ 0,00");
        assert_eq!(format_currency(dec("-0.004")), "R$ 0,00");
    }

    #[test]
    fn negative_amounts_keep_sign_after_prefix() {
        assert_eq!(format_currency(dec("-1234.5")), "R$ -1.234,50");
    }

    #[test]
    fn counts_group_without_decimals() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.000");
        assert_eq!(format_count(1234567), "1.234.567");
        assert_eq!(format_count(-1234), "-1.234");
    }

    #[test]
    fn decimal_with_one_place() {
        assert_eq!(format_decimal(dec("66.666"), 1), "66,7");
        assert_eq!(format_decimal(dec("1000"), 0), "1.000");
    }

    #[test]
    fn dates_and_timestamps() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(format_date(day), "01/02/2024");
        assert_eq!(
            format_timestamp(day.and_hms_opt(9, 5, 59).unwrap()),
            "01/02/2024 09:05"
        );
    }

    #[test]
    fn cells_follow_column_conventions() {
        assert_eq!(
            format_cell("total_value", &Value::Decimal(dec("1500000"))),
            "R$ 1.500.000,00"
        );
        assert_eq!(format_cell("quantity", &Value::Int(12345)), "12.345");
        assert_eq!(format_cell("year", &Value::Int(2024)), "2024");
        assert_eq!(format_cell("month_number", &Value::Int(3)), "3");
        assert_eq!(format_cell("share", &Value::Decimal(dec("12.55"))), "12,6%");
        assert_eq!(format_cell("model", &Value::Text("Civic".into())), "Civic");
        assert_eq!(format_cell("average_value", &Value::Null), MISSING);
    }
}
