//! Report queries
//!
//! One SQL statement per report kind. User-supplied values are always bound
//! as positional parameters. Every joined report uses inner joins, so a sale
//! with a dangling reference drops out of it; `total_sales` reads `vendas`
//! alone and still counts that sale.
//!
//! Money columns are cast to `numeric` so they decode as decimals even when
//! the store keeps `valor_pago` in a floating-point column.

use chrono::NaiveDateTime;

use dealerdash_core::columns;

use crate::connection::Param;

const TOTAL_SALES: &str = r#"
    SELECT
        COUNT(*) AS total_sales,
        SUM(valor_pago)::numeric AS total_value,
        AVG(valor_pago)::numeric AS average_value
    FROM vendas
"#;

const SALES_BY_MODEL: &str = r#"
    SELECT
        v.nome AS model,
        COUNT(*) AS quantity,
        SUM(ven.valor_pago)::numeric AS total_value,
        AVG(ven.valor_pago)::numeric AS average_value
    FROM vendas ven
    JOIN veiculos v ON ven.id_veiculos = v.id_veiculos
    GROUP BY v.id_veiculos, v.nome
    ORDER BY quantity DESC, v.id_veiculos
"#;

// FMMonth drops the blank padding TO_CHAR adds to month names
const SALES_BY_MONTH: &str = r#"
    SELECT
        EXTRACT(YEAR FROM data_venda)::int AS year,
        EXTRACT(MONTH FROM data_venda)::int AS month_number,
        TO_CHAR(data_venda, 'FMMonth') AS month_name,
        COUNT(*) AS quantity,
        SUM(valor_pago)::numeric AS total_value
    FROM vendas
    GROUP BY 1, 2, 3
    ORDER BY year DESC, month_number
"#;

const SALES_BY_MONTH_IN_YEAR: &str = r#"
    SELECT
        EXTRACT(MONTH FROM data_venda)::int AS month_number,
        TO_CHAR(data_venda, 'FMMonth') AS month_name,
        COUNT(*) AS quantity,
        SUM(valor_pago)::numeric AS total_value
    FROM vendas
    WHERE EXTRACT(YEAR FROM data_venda)::int = $1
    GROUP BY 1, 2
    ORDER BY month_number
"#;

const SALES_BY_DEALERSHIP: &str = r#"
    SELECT
        c.concessionaria AS dealership,
        ci.cidade AS city,
        es.estado AS state,
        COUNT(*) AS quantity,
        SUM(ven.valor_pago)::numeric AS total_value,
        AVG(ven.valor_pago)::numeric AS average_value
    FROM vendas ven
    JOIN concessionarias c ON ven.id_concessionarias = c.id_concessionarias
    JOIN cidades ci ON c.id_cidades = ci.id_cidades
    JOIN estados es ON ci.id_estados = es.id_estados
    GROUP BY c.id_concessionarias, c.concessionaria, ci.cidade, es.estado
    ORDER BY total_value DESC, c.id_concessionarias
"#;

const SALES_BY_SALESPERSON: &str = r#"
    SELECT
        v.nome AS salesperson,
        c.concessionaria AS dealership,
        COUNT(*) AS quantity,
        SUM(ven.valor_pago)::numeric AS total_value,
        AVG(ven.valor_pago)::numeric AS average_value
    FROM vendas ven
    JOIN vendedores v ON ven.id_vendedores = v.id_vendedores
    JOIN concessionarias c ON v.id_concessionarias = c.id_concessionarias
    GROUP BY v.id_vendedores, v.nome, c.concessionaria
    ORDER BY total_value DESC, v.id_vendedores
"#;

const RECENT_SALES: &str = r#"
    SELECT
        ven.data_venda AS timestamp,
        v.nome AS model,
        c.concessionaria AS dealership,
        vend.nome AS salesperson,
        cli.cliente AS customer,
        ven.valor_pago::numeric AS paid_amount
    FROM vendas ven
    JOIN veiculos v ON ven.id_veiculos = v.id_veiculos
    JOIN concessionarias c ON ven.id_concessionarias = c.id_concessionarias
    JOIN vendedores vend ON ven.id_vendedores = vend.id_vendedores
    JOIN clientes cli ON ven.id_clientes = cli.id_clientes
    ORDER BY ven.data_venda DESC, ven.id_vendas DESC
    LIMIT $1
"#;

const SALES_IN_PERIOD: &str = r#"
    SELECT
        ven.data_venda AS timestamp,
        v.nome AS model,
        c.concessionaria AS dealership,
        vend.nome AS salesperson,
        cli.cliente AS customer,
        ven.valor_pago::numeric AS paid_amount
    FROM vendas ven
    JOIN veiculos v ON ven.id_veiculos = v.id_veiculos
    JOIN concessionarias c ON ven.id_concessionarias = c.id_concessionarias
    JOIN vendedores vend ON ven.id_vendedores = vend.id_vendedores
    JOIN clientes cli ON ven.id_clientes = cli.id_clientes
    WHERE ven.data_venda BETWEEN $1 AND $2
    ORDER BY ven.data_venda DESC, ven.id_vendas DESC
"#;

/// A reporting request: which query to run and with what parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    TotalSales,
    SalesByModel,
    SalesByMonth { year: Option<i32> },
    SalesByDealership,
    SalesBySalesperson,
    RecentSales { limit: u32 },
    SalesInPeriod { start: NaiveDateTime, end: NaiveDateTime },
}

impl Report {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Report::TotalSales => "total_sales",
            Report::SalesByModel => "sales_by_model",
            Report::SalesByMonth { .. } => "sales_by_month",
            Report::SalesByDealership => "sales_by_dealership",
            Report::SalesBySalesperson => "sales_by_salesperson",
            Report::RecentSales { .. } => "recent_sales",
            Report::SalesInPeriod { .. } => "sales_in_period",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Report::TotalSales => TOTAL_SALES,
            Report::SalesByModel => SALES_BY_MODEL,
            Report::SalesByMonth { year: None } => SALES_BY_MONTH,
            Report::SalesByMonth { year: Some(_) } => SALES_BY_MONTH_IN_YEAR,
            Report::SalesByDealership => SALES_BY_DEALERSHIP,
            Report::SalesBySalesperson => SALES_BY_SALESPERSON,
            Report::RecentSales { .. } => RECENT_SALES,
            Report::SalesInPeriod { .. } => SALES_IN_PERIOD,
        }
    }

    /// The column contract of the table this report returns.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Report::TotalSales => columns::TOTAL_SALES,
            Report::SalesByModel => columns::SALES_BY_MODEL,
            Report::SalesByMonth { year: None } => columns::SALES_BY_MONTH,
            Report::SalesByMonth { year: Some(_) } => columns::SALES_BY_MONTH_IN_YEAR,
            Report::SalesByDealership => columns::SALES_BY_DEALERSHIP,
            Report::SalesBySalesperson => columns::SALES_BY_SALESPERSON,
            Report::RecentSales { .. } | Report::SalesInPeriod { .. } => columns::SALE_LISTING,
        }
    }

    pub fn params(&self) -> Vec<Param> {
        match *self {
            Report::SalesByMonth { year: Some(year) } => vec![Param::Int(year)],
            // a limit is a positive integer
            Report::RecentSales { limit } => vec![Param::BigInt(i64::from(limit.max(1)))],
            Report::SalesInPeriod { start, end } => {
                vec![Param::Timestamp(start), Param::Timestamp(end)]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn all_reports() -> Vec<Report> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        vec![
            Report::TotalSales,
            Report::SalesByModel,
            Report::SalesByMonth { year: None },
            Report::SalesByMonth { year: Some(2024) },
            Report::SalesByDealership,
            Report::SalesBySalesperson,
            Report::RecentSales { limit: 10 },
            Report::SalesInPeriod { start, end },
        ]
    }

    /// Placeholder count must equal the number of bound parameters.
    #[test]
    fn params_match_placeholders() {
        for report in all_reports() {
            let sql = report.sql();
            let placeholders = (1..=9).filter(|n| sql.contains(&format!("${n}"))).count();
            assert_eq!(
                placeholders,
                report.params().len(),
                "placeholder mismatch in {}",
                report.name()
            );
        }
    }

    /// Every contract column appears as an alias in the report's SQL, in order.
    #[test]
    fn sql_aliases_follow_column_contract() {
        for report in all_reports() {
            let sql = report.sql();
            let mut last = 0;
            for column in report.columns() {
                let alias = format!("AS {column}");
                let pos = sql
                    .find(&alias)
                    .unwrap_or_else(|| panic!("{} lacks alias {column}", report.name()));
                assert!(pos >= last, "{} aliases out of order", report.name());
                last = pos;
            }
        }
    }

    #[test]
    fn money_columns_are_cast_to_numeric() {
        for report in all_reports() {
            for column in report
                .columns()
                .iter()
                .filter(|c| columns::MONETARY.contains(*c))
            {
                assert!(
                    report.sql().contains(&format!("::numeric AS {column}")),
                    "{} does not cast {column}",
                    report.name()
                );
            }
        }
    }

    #[test]
    fn recent_sales_limit_is_at_least_one() {
        assert_eq!(
            Report::RecentSales { limit: 0 }.params(),
            vec![Param::BigInt(1)]
        );
        assert_eq!(
            Report::RecentSales { limit: 1000 }.params(),
            vec![Param::BigInt(1000)]
        );
    }

    #[test]
    fn month_report_switches_shape_on_year() {
        let all_years = Report::SalesByMonth { year: None };
        assert!(all_years.columns().contains(&"year"));
        let one_year = Report::SalesByMonth { year: Some(2024) };
        assert!(!one_year.columns().contains(&"year"));
        assert_eq!(one_year.params(), vec![Param::Int(2024)]);
    }

    #[test]
    fn listings_use_inner_joins_only() {
        for report in [
            Report::RecentSales { limit: 5 },
            Report::SalesByModel,
            Report::SalesByDealership,
            Report::SalesBySalesperson,
        ] {
            assert!(!report.sql().contains("LEFT JOIN"), "{}", report.name());
        }
        assert!(!Report::TotalSales.sql().contains("JOIN"));
    }
}
