//! dealerdash CLI - Dealership sales reports from the terminal
//!
//! Each report command runs one query against the sales store and prints it
//! as an aligned table (or JSON records with `--json`). `dashboard` renders
//! every report at once and can refresh on an interval.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use dealerdash_core::config::{
    load_dotenv, DB_HOST_VAR, DB_NAME_VAR, DB_PASSWORD_VAR, DB_PORT_VAR, DB_USER_VAR,
};
use dealerdash_core::format::format_date;
use dealerdash_core::period::{end_of_day, start_of_day};
use dealerdash_core::{DbConfig, HeadlineMetrics, Period, ReportTable};
use dealerdash_db::{SalesQueryService, DEFAULT_RECENT_LIMIT, DEFAULT_TTL};

mod dashboard;
mod render;
mod tracing_setup;

use dashboard::DashboardOptions;
use tracing_setup::{init_tracing, TracingConfig};

/// The one message shown for any connection problem
pub const CONNECTION_FAILED: &str =
    "Could not connect to the sales database. Check the DB_* settings and that the server is running.";

#[derive(Parser, Debug)]
#[command(
    name = "dealerdash",
    author,
    version,
    about = "Sales reports for a network of car dealerships",
    long_about = "Query the dealership sales store: totals, sales by model, month, \
                  dealership and salesperson, recent sales, and a combined dashboard."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Print tables as JSON records instead of aligned text
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection flags; each one given overrides its DB_* environment variable
#[derive(Args, Debug)]
struct DbArgs {
    /// Database host (DB_HOST)
    #[arg(long, global = true, value_name = "HOST")]
    host: Option<String>,

    /// Database port (DB_PORT)
    #[arg(long, global = true, value_name = "PORT")]
    port: Option<u16>,

    /// Database name (DB_NAME)
    #[arg(long, global = true, value_name = "NAME")]
    database: Option<String>,

    /// Database user (DB_USER)
    #[arg(long, global = true, value_name = "USER")]
    user: Option<String>,

    /// Database password (DB_PASSWORD)
    #[arg(long, global = true, value_name = "PASSWORD")]
    password: Option<String>,
}

impl DbArgs {
    /// Flag value standing in for the named DB_* variable.
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            DB_HOST_VAR => self.host.clone(),
            DB_PORT_VAR => self.port.map(|port| port.to_string()),
            DB_NAME_VAR => self.database.clone(),
            DB_USER_VAR => self.user.clone(),
            DB_PASSWORD_VAR => self.password.clone(),
            _ => None,
        }
    }

    /// Resolve settings with flags first, then `env`, then defaults.
    ///
    /// An environment value shadowed by a flag is never parsed.
    fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> dealerdash_core::Result<DbConfig> {
        DbConfig::from_lookup(|key| self.lookup(key).or_else(|| env(key)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Report(ReportCommand),
    /// Every report on one screen
    Dashboard(DashboardArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Total number of sales, total value and average value
    Totals,
    /// Sales per vehicle model, most sold first
    ByModel(TopArgs),
    /// Sales per month, optionally within one year
    ByMonth {
        /// Only months of this year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Sales per dealership with city and state, highest value first
    ByDealership(TopArgs),
    /// Sales per salesperson with their dealership, highest value first
    BySalesperson(TopArgs),
    /// The most recent sales, newest first
    Recent {
        /// Maximum number of sales to list
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },
    /// Sales between two dates, both days included
    Period {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
}

#[derive(Args, Debug)]
struct TopArgs {
    /// Show only the first N rows
    #[arg(long, value_name = "N")]
    top: Option<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum PeriodArg {
    All,
    Last30,
    Last90,
    LastYear,
    Custom,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Which sales the listing and daily trend cover
    #[arg(long, value_enum, default_value_t = PeriodArg::All)]
    period: PeriodArg,

    /// First day of a custom period (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of a custom period (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Refresh every SECS seconds until Ctrl-C
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,

    /// Seconds to keep reusing the database connection between refreshes
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TTL.as_secs())]
    cache_ttl: u64,
}

impl DashboardArgs {
    fn period(&self) -> Result<Period> {
        let period = match (self.period, self.start, self.end) {
            (PeriodArg::Custom, Some(start), Some(end)) => Period::custom(start, end)?,
            (PeriodArg::Custom, _, _) => bail!("--period custom needs both --start and --end"),
            (_, None, None) => match self.period {
                PeriodArg::Last30 => Period::Last30Days,
                PeriodArg::Last90 => Period::Last90Days,
                PeriodArg::LastYear => Period::LastYear,
                PeriodArg::All | PeriodArg::Custom => Period::All,
            },
            _ => bail!("--start and --end only apply to --period custom"),
        };
        Ok(period)
    }

    fn options(&self, json: bool) -> Result<DashboardOptions> {
        if self.watch == Some(0) {
            bail!("--watch interval must be at least one second");
        }
        Ok(DashboardOptions {
            period: self.period()?,
            json,
            watch: self.watch.map(Duration::from_secs),
            cache_ttl: Duration::from_secs(self.cache_ttl),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    load_dotenv().context("failed to load database settings")?;
    let config = cli
        .db
        .resolve(|key| std::env::var(key).ok())
        .context("failed to load database settings")?;
    debug!(target_db = %config, "resolved database settings");

    match cli.command {
        Commands::Dashboard(args) => dashboard::run(config, args.options(cli.json)?).await,
        Commands::Report(command) => run_report(command, &config, cli.json).await,
    }
}

async fn run_report(command: ReportCommand, config: &DbConfig, json: bool) -> Result<()> {
    // validate arguments before touching the database
    if let ReportCommand::Period { start, end } = command {
        Period::custom(start, end)?;
    }

    let mut service = SalesQueryService::connect(config).await;
    if !service.is_connected() {
        bail!(CONNECTION_FAILED);
    }

    let result = match command {
        ReportCommand::Totals => {
            let metrics = HeadlineMetrics::from_totals(&service.total_sales().await);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&metrics).context("failed to serialize totals")?
                );
            } else {
                print!("{}", render::render_metrics(metrics.as_ref(), None));
            }
            Ok(())
        }
        ReportCommand::ByModel(top) => {
            let table = service.sales_by_model().await;
            emit("Sales by model", &top.apply(table), json)
        }
        ReportCommand::ByMonth { year } => {
            let title = match year {
                Some(year) => format!("Sales by month in {year}"),
                None => "Sales by month".to_string(),
            };
            emit(&title, &service.sales_by_month(year).await, json)
        }
        ReportCommand::ByDealership(top) => {
            let table = service.sales_by_dealership().await;
            emit("Sales by dealership", &top.apply(table), json)
        }
        ReportCommand::BySalesperson(top) => {
            let table = service.sales_by_salesperson().await;
            emit("Sales by salesperson", &top.apply(table), json)
        }
        ReportCommand::Recent { limit } => {
            emit("Recent sales", &service.recent_sales(limit).await, json)
        }
        ReportCommand::Period { start, end } => {
            let table = service
                .sales_in_period(start_of_day(start), end_of_day(end))
                .await;
            let title = format!("Sales from {} to {}", format_date(start), format_date(end));
            emit(&title, &table, json)
        }
    };

    service.close().await;
    result
}

impl TopArgs {
    fn apply(&self, table: ReportTable) -> ReportTable {
        match self.top {
            Some(n) => table.head(n),
            None => table,
        }
    }
}

fn emit(title: &str, table: &ReportTable, json: bool) -> Result<()> {
    if json {
        println!("{}", table.to_json_pretty()?);
    } else {
        print!("{}", render::render_table(title, table));
    }
    Ok(())
}
