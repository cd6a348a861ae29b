//! Connection manager
//!
//! Holds at most one live PostgreSQL connection. Not a pool: reports run one
//! after another from a single caller, and `&mut self` on every query keeps it
//! that way.
//!
//! Two query surfaces:
//! - [`ConnectionManager::try_execute`] returns `Result<ReportTable, DbError>`
//! - [`ConnectionManager::execute`] logs any failure and returns an empty,
//!   column-less table instead

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgColumn, PgConnectOptions, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, Postgres, Row, Statement, TypeInfo, ValueRef};
use tracing::{debug, error, info, warn};

use dealerdash_core::{DbConfig, ReportTable, Value};

use crate::error::DbError;

const APPLICATION_NAME: &str = "dealerdash";

/// A positional query parameter (`$1`, `$2`, ...)
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i32),
    BigInt(i64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// Build sqlx connect options from the five connection settings.
pub fn connect_options(config: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
        .application_name(APPLICATION_NAME)
}

/// Owner of the single connection to the sales store
pub struct ConnectionManager {
    options: PgConnectOptions,
    conn: Option<PgConnection>,
}

impl ConnectionManager {
    /// A disconnected manager for `config`. Call [`connect`](Self::connect) next.
    pub fn new(config: &DbConfig) -> Self {
        Self::with_options(connect_options(config))
    }

    pub fn with_options(options: PgConnectOptions) -> Self {
        Self {
            options,
            conn: None,
        }
    }

    /// Open the connection. Logs and returns `false` on failure.
    pub async fn connect(&mut self) -> bool {
        match self.try_connect().await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "could not connect to the database");
                false
            }
        }
    }

    /// Open the connection, keeping an existing one if already connected.
    pub async fn try_connect(&mut self) -> Result<(), DbError> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(DbError::Connect)?;

        info!(
            host = self.options.get_host(),
            port = self.options.get_port(),
            database = self.options.get_database().unwrap_or_default(),
            "connected to database"
        );
        self.conn = Some(conn);
        Ok(())
    }

    /// Whether a connection handle is held. No round-trip is made.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Release the connection. No-op when already disconnected.
    pub async fn disconnect(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        if let Err(err) = conn.close().await {
            warn!(error = %err, "error while closing database connection");
        }
        info!("disconnected from database");
    }

    /// Run `query` and return its rows, or an empty table with no columns if
    /// not connected or anything fails.
    pub async fn execute(&mut self, query: &str, params: &[Param]) -> ReportTable {
        match self.try_execute(query, params).await {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "query failed; returning empty result");
                ReportTable::empty()
            }
        }
    }

    /// Run `query` with positional `params`.
    ///
    /// Column names come from the prepared statement, so a query that matches
    /// no rows still yields its columns.
    pub async fn try_execute(
        &mut self,
        query: &str,
        params: &[Param],
    ) -> Result<ReportTable, DbError> {
        let conn = self.conn.as_mut().ok_or(DbError::NotConnected)?;

        let statement = (&mut *conn).prepare(query).await?;
        let mut table = ReportTable::new(statement.columns().iter().map(|c| c.name()));

        let rows = params
            .iter()
            .fold(statement.query(), bind_param)
            .fetch_all(&mut *conn)
            .await?;

        for row in &rows {
            table.push_row(decode_row(row)?)?;
        }

        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            "query executed"
        );
        Ok(table)
    }
}

fn bind_param<'q>(
    query: Query<'q, Postgres, PgArguments>,
    param: &Param,
) -> Query<'q, Postgres, PgArguments> {
    match param {
        Param::Int(v) => query.bind(*v),
        Param::BigInt(v) => query.bind(*v),
        Param::Text(v) => query.bind(v.clone()),
        Param::Timestamp(v) => query.bind(*v),
    }
}

fn decode_row(row: &PgRow) -> Result<Vec<Value>, DbError> {
    row.columns()
        .iter()
        .map(|column| decode_cell(row, column))
        .collect()
}

fn decode_cell(row: &PgRow, column: &PgColumn) -> Result<Value, DbError> {
    let idx = column.ordinal();
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match column.type_info().name() {
        "INT2" => Value::Int(i64::from(row.try_get::<i16, _>(idx)?)),
        "INT4" => Value::Int(i64::from(row.try_get::<i32, _>(idx)?)),
        "INT8" => Value::Int(row.try_get::<i64, _>(idx)?),
        "NUMERIC" => Value::Decimal(row.try_get::<Decimal, _>(idx)?),
        "FLOAT4" => Value::Float(f64::from(row.try_get::<f32, _>(idx)?)),
        "FLOAT8" => Value::Float(row.try_get::<f64, _>(idx)?),
        "BOOL" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::Text(row.try_get::<String, _>(idx)?),
        "DATE" => Value::Date(row.try_get::<NaiveDate, _>(idx)?),
        "TIMESTAMP" => Value::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
        "TIMESTAMPTZ" => Value::Timestamp(row.try_get::<DateTime<Utc>, _>(idx)?.naive_utc()),
        other => {
            return Err(DbError::Decode {
                column: column.name().to_string(),
                type_name: other.to_string(),
            });
        }
    };
    Ok(value)
}
