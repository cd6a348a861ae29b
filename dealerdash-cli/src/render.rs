//! Plain-text rendering of report tables and metric cards

use dealerdash_core::format::format_cell;
use dealerdash_core::{HeadlineMetrics, ReportTable, Value};

pub const NO_DATA: &str = "No data available.";

const GAP: &str = "  ";

/// A titled, column-aligned table. Numeric columns are right-aligned.
pub fn render_table(title: &str, table: &ReportTable) -> String {
    let mut lines = vec![title.to_string()];
    if table.is_empty() {
        lines.push(format!("{GAP}{NO_DATA}"));
        return lines.join("\n") + "\n";
    }

    let columns = table.columns();
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(row)
                .map(|(column, value)| format_cell(column, value))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let numeric: Vec<bool> = (0..columns.len())
        .map(|i| table.rows().iter().any(|row| is_numeric(&row[i])))
        .collect();

    let line = |fields: &[String]| {
        let padded: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let width = widths[i];
                if numeric[i] {
                    format!("{field:>width$}")
                } else {
                    format!("{field:<width$}")
                }
            })
            .collect();
        format!("{GAP}{}", padded.join(GAP).trim_end())
    };

    lines.push(line(columns));
    lines.push(format!(
        "{GAP}{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(GAP)
    ));
    lines.extend(cells.iter().map(|row| line(row.as_slice())));

    lines.join("\n") + "\n"
}

/// The headline metric cards, plus the listing size when a listing was loaded.
pub fn render_metrics(metrics: Option<&HeadlineMetrics>, sales_in_period: Option<&str>) -> String {
    let Some(metrics) = metrics else {
        return format!("Totals\n{GAP}{NO_DATA}\n");
    };

    let mut cards = vec![
        ("Total sales", metrics.total_sales.as_str()),
        ("Total value", metrics.total_value.as_str()),
        ("Average value", metrics.average_value.as_str()),
    ];
    if let Some(count) = sales_in_period {
        cards.push(("Sales in period", count));
    }

    let width = cards
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    let mut out = String::from("Totals\n");
    for (label, value) in cards {
        out.push_str(&format!("{GAP}{label:<width$}{GAP}{value}\n"));
    }
    out
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Decimal(_) | Value::Float(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealerdash_core::columns;

    fn model_table() -> ReportTable {
        let mut table = ReportTable::with_columns(columns::SALES_BY_MODEL);
        table
            .push_row(vec![
                Value::Text("Civic".into()),
                Value::Int(1200),
                Value::Decimal("60000000.50".parse().unwrap()),
                Value::Decimal("50000.00".parse().unwrap()),
            ])
            .unwrap();
        table
            .push_row(vec![
                Value::Text("Corolla".into()),
                Value::Int(3),
                Value::Decimal("135000.30".parse().unwrap()),
                Value::Null,
            ])
            .unwrap();
        table
    }

    #[test]
    fn empty_table_prints_no_data_line() {
        let empty = ReportTable::with_columns(columns::SALES_BY_MODEL);
        let out = render_table("Sales by model", &empty);
        assert_eq!(out, format!("Sales by model\n  {NO_DATA}\n"));
    }

    #[test]
    fn cells_use_display_conventions() {
        let out = render_table("Sales by model", &model_table());
        assert!(out.contains("R$ 60.000.000,50"));
        assert!(out.contains("1.200"));
        assert!(out.contains("R$ 135.000,30"));
        // null average
        assert!(out.lines().last().unwrap().trim_end().ends_with('-'));
    }

    #[test]
    fn numbers_are_right_aligned() {
        let out = render_table("Sales by model", &model_table());
        let lines: Vec<&str> = out.lines().collect();
        let civic = lines[3];
        let corolla = lines[4];
        let civic_qty_end = civic.find("1.200").unwrap() + "1.200".len();
        let corolla_qty_end = corolla.find(" 3 ").unwrap() + 2;
        assert_eq!(civic_qty_end, corolla_qty_end);
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        let mut table = ReportTable::with_columns(&["dealership", "quantity"]);
        table
            .push_row(vec![Value::Text("Concessionária".into()), Value::Int(1)])
            .unwrap();
        table
            .push_row(vec![Value::Text("Loja".into()), Value::Int(22)])
            .unwrap();

        let out = render_table("t", &table);
        let widths: Vec<usize> = out.lines().skip(3).map(|l| l.chars().count()).collect();
        assert_eq!(widths[0], widths[1]);
    }

    #[test]
    fn metrics_render_as_cards() {
        let metrics = HeadlineMetrics {
            total_sales: "3".into(),
            total_value: "R$ 147.000,30".into(),
            average_value: "R$ 49.000,10".into(),
        };
        let out = render_metrics(Some(&metrics), Some("2"));
        assert!(out.contains("Total value      R$ 147.000,30"));
        assert!(out.contains("Sales in period  2"));

        assert!(render_metrics(None, None).contains(NO_DATA));
    }
}
