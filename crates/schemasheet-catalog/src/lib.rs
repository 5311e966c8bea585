//! Schema readers for documenting a database
//!
//! This crate reads table and column metadata from MySQL's
//! `information_schema` views into the [`schemasheet_core::Database`] model.
//!
//! ## Features
//!
//! - `mysql` (default) - MySQL / MariaDB support via sqlx
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemasheet_catalog::{MySqlReader, SchemaReader};
//!
//! let reader = MySqlReader::connect(&config.database).await?;
//! reader.test_connection().await?;
//! let snapshot = reader.read_database_isolated().await?;
//! ```

pub mod adapter;
pub mod introspect;
pub mod mock;
pub mod mysql;

pub use adapter::{CatalogError, SchemaReader, SchemaSnapshot, TableFailure};
pub use mock::MockReader;
pub use mysql::MySqlReader;
