//! dealerdash-db: query layer over the dealership sales store
//!
//! # Layers
//!
//! - [`ConnectionManager`] owns one PostgreSQL connection
//! - [`SalesQueryService`] runs the report queries on top of it
//! - [`ServiceCache`] keeps a service alive for a fixed window
//!
//! The store's schema is consumed as-is; nothing here creates or migrates it.

pub mod cache;
pub mod connection;
pub mod error;
pub mod queries;
pub mod service;

pub use cache::{ServiceCache, DEFAULT_TTL};
pub use connection::{connect_options, ConnectionManager, Param};
pub use error::DbError;
pub use queries::Report;
pub use service::{SalesQueryService, DEFAULT_RECENT_LIMIT};
