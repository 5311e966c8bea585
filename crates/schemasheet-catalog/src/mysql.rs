//! MySQL schema reader using information_schema
//!
//! Connects with a single-connection pool (the export is strictly sequential)
//! and reads each table with the four queries in [`crate::introspect`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = DatabaseConfig { database: "app".into(), ..Default::default() };
//! let reader = MySqlReader::connect(&config).await?;
//! let db = reader.read_database().await?;
//! ```
//!
//! Reference: https://dev.mysql.com/doc/refman/8.0/en/information-schema-columns-table.html

use crate::adapter::{CatalogError, SchemaReader};
use schemasheet_core::{DatabaseConfig, Table};

#[cfg(feature = "mysql")]
use crate::introspect::{
    assemble_columns, ColumnRow, ForeignKeyRow, COLUMNS_QUERY, FOREIGN_KEYS_QUERY,
    INDEXED_COLUMNS_QUERY, TABLES_QUERY, UNIQUE_COLUMNS_QUERY,
};

#[cfg(feature = "mysql")]
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow},
    Row,
};

#[cfg(feature = "mysql")]
use std::collections::HashSet;

#[cfg(feature = "mysql")]
use tracing::debug;

/// MySQL schema reader
pub struct MySqlReader {
    /// Connection pool (only available with mysql feature)
    #[cfg(feature = "mysql")]
    pool: MySqlPool,

    /// Schema being documented
    database: String,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "mysql"))]
    _phantom: std::marker::PhantomData<()>,
}

impl MySqlReader {
    /// Connect using explicit settings
    #[cfg(feature = "mysql")]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, CatalogError> {
        config.validate().map_err(|e| CatalogError::Config(e.to_string()))?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| CatalogError::Connection(format!(
                "Failed to connect to MySQL at {}: {}",
                config.display_target(), e
            )))?;

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }

    /// Create reader without mysql feature (returns error)
    #[cfg(not(feature = "mysql"))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, CatalogError> {
        let _ = config;
        Err(CatalogError::Config(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }

    #[cfg(feature = "mysql")]
    async fn fetch(&self, query: &str, table: &str) -> Result<Vec<MySqlRow>, CatalogError> {
        sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, table))
    }

    #[cfg(feature = "mysql")]
    async fn column_set(&self, query: &str, table: &str) -> Result<HashSet<String>, CatalogError> {
        self.fetch(query, table)
            .await?
            .iter()
            .map(|row| get_string(row, "column_name"))
            .collect()
    }
}

#[cfg(feature = "mysql")]
fn get_string(row: &MySqlRow, column: &str) -> Result<String, CatalogError> {
    row.try_get::<Option<String>, _>(column)
        .map(Option::unwrap_or_default)
        .map_err(|e| CatalogError::Scan(format!("{}: {}", column, e)))
}

#[cfg(feature = "mysql")]
fn get_optional(row: &MySqlRow, column: &str) -> Result<Option<String>, CatalogError> {
    row.try_get::<Option<String>, _>(column)
        .map_err(|e| CatalogError::Scan(format!("{}: {}", column, e)))
}

/// Map a driver error onto the catalog taxonomy
#[cfg(feature = "mysql")]
fn classify(error: sqlx::Error, table: &str) -> CatalogError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => CatalogError::Connection(error.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_) => CatalogError::Scan(format!("{}: {}", table, error)),
        other => CatalogError::Query(format!("{}: {}", table, other)),
    }
}

#[async_trait::async_trait]
impl SchemaReader for MySqlReader {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    #[cfg(feature = "mysql")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Connection(format!("Connection test failed: {}", e)))?;

        Ok(())
    }

    #[cfg(not(feature = "mysql"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Config(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }

    #[cfg(feature = "mysql")]
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        let rows = sqlx::query(TABLES_QUERY)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, &self.database))?;

        let tables = rows
            .iter()
            .map(|row| get_string(row, "table_name"))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(database = %self.database, count = tables.len(), "listed tables");
        Ok(tables)
    }

    #[cfg(not(feature = "mysql"))]
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Config(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }

    #[cfg(feature = "mysql")]
    async fn read_table(&self, table: &str) -> Result<Table, CatalogError> {
        let rows = self
            .fetch(COLUMNS_QUERY, table)
            .await?
            .iter()
            .map(|row| {
                Ok(ColumnRow {
                    name: get_string(row, "column_name")?,
                    column_type: get_string(row, "column_type")?,
                    is_nullable: get_string(row, "is_nullable")?,
                    default: get_optional(row, "column_default")?,
                    comment: get_string(row, "column_comment")?,
                    column_key: get_string(row, "column_key")?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        if rows.is_empty() {
            return Err(CatalogError::TableNotFound(format!(
                "{}.{} not found or has no columns",
                self.database, table
            )));
        }

        let unique = self.column_set(UNIQUE_COLUMNS_QUERY, table).await?;
        let indexed = self.column_set(INDEXED_COLUMNS_QUERY, table).await?;

        let foreign_keys = self
            .fetch(FOREIGN_KEYS_QUERY, table)
            .await?
            .iter()
            .map(|row| {
                Ok(ForeignKeyRow {
                    column: get_string(row, "column_name")?,
                    referenced_table: get_optional(row, "referenced_table")?,
                    referenced_column: get_optional(row, "referenced_column")?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        debug!(
            table,
            columns = rows.len(),
            unique = unique.len(),
            indexed = indexed.len(),
            foreign_keys = foreign_keys.len(),
            "fetched column metadata"
        );

        Ok(Table::new(table, assemble_columns(rows, &unique, &indexed, &foreign_keys)))
    }

    #[cfg(not(feature = "mysql"))]
    async fn read_table(&self, _table: &str) -> Result<Table, CatalogError> {
        Err(CatalogError::Config(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }
}
