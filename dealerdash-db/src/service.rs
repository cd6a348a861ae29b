//! Sales query service
//!
//! One method per reporting need. Each returns a [`ReportTable`] with the
//! report's column contract. When the service never connected, or a query
//! fails, the result is a zero-row table with those same columns; use
//! [`SalesQueryService::try_report`] to see the failure instead.

use chrono::NaiveDateTime;
use tracing::{debug, error};

use dealerdash_core::{DbConfig, ReportTable};

use crate::connection::ConnectionManager;
use crate::error::DbError;
use crate::queries::Report;

/// Default row cap for [`SalesQueryService::recent_sales`]
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Reporting operations over one owned connection
pub struct SalesQueryService {
    db: ConnectionManager,
    connected: bool,
}

impl SalesQueryService {
    /// Open a connection for `config`. Never fails; check
    /// [`is_connected`](Self::is_connected) afterwards.
    pub async fn connect(config: &DbConfig) -> Self {
        debug!(target_db = %config, "opening sales query service");
        Self::open(ConnectionManager::new(config)).await
    }

    /// Take ownership of `db` and connect it.
    pub async fn open(mut db: ConnectionManager) -> Self {
        let connected = db.connect().await;
        Self { db, connected }
    }

    /// False when the connection could not be opened (or was closed). Every
    /// report then comes back empty without querying.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Run `report`, surfacing failures.
    pub async fn try_report(&mut self, report: Report) -> Result<ReportTable, DbError> {
        if !self.connected {
            return Err(DbError::NotConnected);
        }

        let table = self.db.try_execute(report.sql(), &report.params()).await?;
        debug!(
            report = report.name(),
            rows = table.len(),
            "report fetched"
        );
        Ok(table)
    }

    /// Run `report`; any failure yields an empty table with the report's columns.
    pub async fn report(&mut self, report: Report) -> ReportTable {
        match self.try_report(report).await {
            Ok(table) => table,
            Err(DbError::NotConnected) => ReportTable::with_columns(report.columns()),
            Err(err) => {
                error!(
                    report = report.name(),
                    error = %err,
                    "report failed; returning empty table"
                );
                ReportTable::with_columns(report.columns())
            }
        }
    }

    /// `total_sales, total_value, average_value` over every sale row.
    pub async fn total_sales(&mut self) -> ReportTable {
        self.report(Report::TotalSales).await
    }

    /// Per model, most sold first.
    pub async fn sales_by_model(&mut self) -> ReportTable {
        self.report(Report::SalesByModel).await
    }

    /// Per month. With `year` only that year's months; without it, every
    /// (year, month) pair, newest year first.
    pub async fn sales_by_month(&mut self, year: Option<i32>) -> ReportTable {
        self.report(Report::SalesByMonth { year }).await
    }

    /// Per dealership with its city and state, highest total value first.
    pub async fn sales_by_dealership(&mut self) -> ReportTable {
        self.report(Report::SalesByDealership).await
    }

    /// Per salesperson with their dealership, highest total value first.
    pub async fn sales_by_salesperson(&mut self) -> ReportTable {
        self.report(Report::SalesBySalesperson).await
    }

    /// The `limit` most recent sales, newest first.
    pub async fn recent_sales(&mut self, limit: u32) -> ReportTable {
        self.report(Report::RecentSales { limit }).await
    }

    /// Sales with `start <= timestamp <= end`, newest first. The range is not
    /// validated; `start > end` simply matches nothing.
    pub async fn sales_in_period(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ReportTable {
        self.report(Report::SalesInPeriod { start, end }).await
    }

    /// Release the connection. Later reports come back empty.
    pub async fn close(&mut self) {
        self.db.disconnect().await;
        self.connected = false;
    }
}
