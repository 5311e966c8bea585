//! schemasheet core
//!
//! Domain model shared by the export and import halves: the schema snapshot
//! read from MySQL, configuration, and the JSON run report.

pub mod schema;
pub mod report;
pub mod config;

pub use schema::{Database, Table, Column, ForeignKey};
pub use report::{Report, ReportVersion, ReportEntry, EntryStatus, RunKind};
pub use config::{Config, ConfigError, DatabaseConfig, ExportConfig, ImportConfig};
