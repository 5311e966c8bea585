//! Schema reader trait for fetching table metadata

use schemasheet_core::{Database, Table};
use tracing::{info, warn};

/// Errors that can occur when reading a schema
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to read result row: {0}")]
    Scan(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether the error invalidates the whole run rather than one table
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Config(_))
    }
}

/// A table that could not be read
#[derive(Debug, Clone)]
pub struct TableFailure {
    pub table: String,
    pub error: CatalogError,
}

/// Result of a tolerant read: the tables that succeeded plus the ones that did not
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub database: Database,
    pub failures: Vec<TableFailure>,
}

impl SchemaSnapshot {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Trait for readers that can introspect a database schema
#[async_trait::async_trait]
pub trait SchemaReader: Send + Sync {
    /// Get the reader name (e.g., "MySQL")
    fn name(&self) -> &'static str;

    /// Name of the schema being read
    fn database_name(&self) -> &str;

    /// Test the connection before reading anything
    async fn test_connection(&self) -> Result<(), CatalogError>;

    /// Table names of the schema, sorted by name
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError>;

    /// Read one table with its columns in declaration order
    async fn read_table(&self, table: &str) -> Result<Table, CatalogError>;

    /// Read every table, stopping at the first error
    async fn read_database(&self) -> Result<Database, CatalogError> {
        let names = self.list_tables().await?;
        let mut tables = Vec::with_capacity(names.len());

        for name in names {
            let table = self.read_table(&name).await?;
            info!(table = %table.name, columns = table.columns.len(), "read table");
            tables.push(table);
        }

        Ok(Database::new(self.database_name(), tables))
    }

    /// Read every table, skipping tables whose queries fail
    ///
    /// Connection and configuration errors still abort the read.
    async fn read_database_isolated(&self) -> Result<SchemaSnapshot, CatalogError> {
        let names = self.list_tables().await?;
        let mut tables = Vec::with_capacity(names.len());
        let mut failures = Vec::new();

        for name in names {
            match self.read_table(&name).await {
                Ok(table) => {
                    info!(table = %table.name, columns = table.columns.len(), "read table");
                    tables.push(table);
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!(table = %name, %error, "skipping table");
                    failures.push(TableFailure { table: name, error });
                }
            }
        }

        Ok(SchemaSnapshot {
            database: Database::new(self.database_name(), tables),
            failures,
        })
    }
}
