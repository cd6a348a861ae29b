//! dealerdash-core: report tables and presentation helpers
//!
//! Everything here is independent of the database driver. The query layer
//! (`dealerdash-db`) produces [`ReportTable`] values; this crate defines their
//! column contracts and turns them into what the dashboard shows.

pub mod config;
pub mod error;
pub mod format;
pub mod period;
pub mod report;
pub mod shaping;

pub use config::DbConfig;
pub use error::{DashError, Result};
pub use period::Period;
pub use report::{columns, ReportTable, Value};
pub use shaping::{daily_trend, share_of_total, HeadlineMetrics};
