//! The `dashboard` command: every report on one screen

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use serde_json::json;
use tracing::{debug, info};

use dealerdash_core::format::format_count;
use dealerdash_core::{daily_trend, share_of_total, DbConfig, HeadlineMetrics, Period, ReportTable};
use dealerdash_db::{SalesQueryService, ServiceCache};

use crate::render::{render_metrics, render_table};
use crate::CONNECTION_FAILED;

/// Row cap for the listing when no period filter is set
pub const LISTING_LIMIT: u32 = 1000;

const TOP_MODELS: usize = 10;
const TOP_DISTRIBUTION: usize = 8;
const TOP_DEALERSHIPS: usize = 10;
const TOP_SALESPEOPLE: usize = 15;

/// One snapshot of every dashboard section
pub struct Dashboard {
    period: Period,
    metrics: Option<HeadlineMetrics>,
    listing: ReportTable,
    by_model: ReportTable,
    distribution: ReportTable,
    by_month: ReportTable,
    by_dealership: ReportTable,
    by_salesperson: ReportTable,
    trend: ReportTable,
}

impl Dashboard {
    pub async fn load(service: &mut SalesQueryService, period: Period, now: NaiveDateTime) -> Self {
        let listing = match period.resolve(now) {
            Some((start, end)) => service.sales_in_period(start, end).await,
            None => service.recent_sales(LISTING_LIMIT).await,
        };
        let metrics = HeadlineMetrics::from_totals(&service.total_sales().await);
        let by_model = service.sales_by_model().await;

        Self {
            period,
            metrics,
            trend: daily_trend(&listing),
            distribution: share_of_total(&by_model.head(TOP_DISTRIBUTION), "quantity"),
            by_model: by_model.head(TOP_MODELS),
            by_month: service.sales_by_month(None).await,
            by_dealership: service.sales_by_dealership().await.head(TOP_DEALERSHIPS),
            by_salesperson: service.sales_by_salesperson().await.head(TOP_SALESPEOPLE),
            listing,
        }
    }

    pub fn to_text(&self) -> String {
        let sales_in_period = format_count(self.listing.len() as i64);
        [
            format!("Dealership sales dashboard ({})\n", self.period),
            render_metrics(self.metrics.as_ref(), Some(&sales_in_period)),
            render_table("Top models", &self.by_model),
            render_table("Model distribution", &self.distribution),
            render_table("Sales by month", &self.by_month),
            render_table("Top dealerships", &self.by_dealership),
            render_table("Top salespeople", &self.by_salesperson),
            render_table("Daily trend", &self.trend),
            render_table("Sales", &self.listing),
        ]
        .join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        let value = json!({
            "period": self.period.to_string(),
            "metrics": self.metrics,
            "sales_in_period": self.listing.len(),
            "by_model": self.by_model,
            "distribution": self.distribution,
            "by_month": self.by_month,
            "by_dealership": self.by_dealership,
            "by_salesperson": self.by_salesperson,
            "daily_trend": self.trend,
            "sales": self.listing,
        });
        serde_json::to_string_pretty(&value).context("failed to serialize dashboard")
    }
}

pub struct DashboardOptions {
    pub period: Period,
    pub json: bool,
    pub watch: Option<Duration>,
    pub cache_ttl: Duration,
}

/// Render the dashboard once, or every `watch` interval until Ctrl-C.
///
/// Re-renders reuse the cached service until its TTL runs out.
pub async fn run(config: DbConfig, options: DashboardOptions) -> Result<()> {
    let mut cache = ServiceCache::new(config, options.cache_ttl);
    let result = render_loop(&mut cache, &options).await;
    cache.invalidate().await;
    result
}

async fn render_loop(cache: &mut ServiceCache, options: &DashboardOptions) -> Result<()> {
    loop {
        let service = cache.get().await;
        if !service.is_connected() {
            bail!(CONNECTION_FAILED);
        }

        let now = Local::now().naive_local();
        let dashboard = Dashboard::load(service, options.period, now).await;
        if options.json {
            println!("{}", dashboard.to_json()?);
        } else {
            println!("{}", dashboard.to_text());
        }

        let Some(interval) = options.watch else {
            return Ok(());
        };
        debug!(generation = cache.generation(), ?interval, "waiting for next refresh");

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                info!("stopping dashboard");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dealerdash_core::columns;

    async fn offline_dashboard(period: Period) -> Dashboard {
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DbConfig::default()
        };
        let mut service = SalesQueryService::connect(&config).await;
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Dashboard::load(&mut service, period, now).await
    }

    #[tokio::test]
    async fn offline_dashboard_keeps_every_section() {
        let dashboard = offline_dashboard(Period::Last30Days).await;
        assert!(dashboard.listing.has_columns(columns::SALE_LISTING));
        assert!(dashboard.trend.has_columns(columns::DAILY_TREND));
        assert!(dashboard.by_month.has_columns(columns::SALES_BY_MONTH));

        let text = dashboard.to_text();
        assert!(text.starts_with("Dealership sales dashboard (last 30 days)"));
        for title in ["Top models", "Model distribution", "Daily trend", "Sales"] {
            assert!(text.contains(title), "missing section {title}");
        }
    }

    #[tokio::test]
    async fn dashboard_json_lists_sections() {
        let dashboard = offline_dashboard(Period::All).await;
        let json = dashboard.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["period"], "all data");
        assert_eq!(value["sales_in_period"], 0);
        assert!(value["sales"].as_array().unwrap().is_empty());
        assert!(value["by_salesperson"].as_array().unwrap().is_empty());
    }
}
