//! Mock schema reader for testing
//!
//! Serves predefined tables without connecting to any database. Useful for
//! testing the export pipeline and for simulating per-table failures.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemasheet_catalog::{MockReader, SchemaReader};
//! use schemasheet_core::{Column, Table};
//!
//! let reader = MockReader::new("app")
//!     .with_table(Table::new("users", vec![Column::new("id", "int").primary_key()]));
//!
//! let db = reader.read_database().await?;
//! ```

use crate::adapter::{CatalogError, SchemaReader};
use schemasheet_core::Table;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock schema reader for testing
///
/// Tables are listed in name order, like the MySQL reader.
#[derive(Clone)]
pub struct MockReader {
    database: String,

    /// Predefined tables by name
    tables: Arc<RwLock<BTreeMap<String, Table>>>,

    /// Errors to return for specific tables
    errors: Arc<RwLock<HashMap<String, CatalogError>>>,

    /// Simulate connection failure
    fail_connection: bool,
}

impl MockReader {
    /// Create a new mock reader with no tables
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            tables: Arc::new(RwLock::new(BTreeMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
        }
    }

    /// Add a table (builder form, for use before sharing the reader)
    pub fn with_table(self, table: Table) -> Self {
        if let Ok(mut tables) = self.tables.try_write() {
            tables.insert(table.name.clone(), table);
        }
        self
    }

    /// Add a table
    pub async fn add_table(&self, table: Table) {
        self.tables.write().await.insert(table.name.clone(), table);
    }

    /// Configure an error to be returned when a table is read
    ///
    /// The table is still listed, so the failure surfaces in `read_table`.
    pub async fn add_error_for_table(&self, table: &str, error: CatalogError) {
        self.errors.write().await.insert(table.to_string(), error);
    }

    /// Configure to fail connection tests and listing
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Get the number of tables stored in the reader
    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    fn connection_error(&self) -> CatalogError {
        CatalogError::Connection("Simulated connection failure".to_string())
    }
}

#[async_trait::async_trait]
impl SchemaReader for MockReader {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        if self.fail_connection {
            Err(self.connection_error())
        } else {
            Ok(())
        }
    }

    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        if self.fail_connection {
            return Err(self.connection_error());
        }

        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        for name in self.errors.read().await.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_table(&self, table: &str) -> Result<Table, CatalogError> {
        if self.fail_connection {
            return Err(self.connection_error());
        }

        // Check for configured errors first
        if let Some(error) = self.errors.read().await.get(table) {
            return Err(error.clone());
        }

        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(table.to_string()))
    }
}
