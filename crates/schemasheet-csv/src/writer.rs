//! Table → CSV writer

use crate::format::{column_record, HEADER};
use crate::CsvError;
use schemasheet_core::{Database, Table};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `<table>.csv` files into one directory
#[derive(Debug, Clone)]
pub struct CsvWriter {
    dir: PathBuf,
}

impl CsvWriter {
    /// Write into `dir`, which must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file a table is written to
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(table)))
    }

    /// Write one table: a header line plus one line per column
    pub fn write_table(&self, table: &Table) -> Result<PathBuf, CsvError> {
        let path = self.table_path(&table.name);

        let mut writer = csv::Writer::from_path(&path).map_err(|e| CsvError::csv(&path, e))?;

        writer.write_record(HEADER).map_err(|e| CsvError::csv(&path, e))?;
        for col in &table.columns {
            writer
                .write_record(column_record(col))
                .map_err(|e| CsvError::csv(&path, e))?;
        }
        writer.flush().map_err(|e| CsvError::fs(&path, e))?;

        info!(table = %table.name, columns = table.columns.len(), path = %path.display(), "wrote csv");
        Ok(path)
    }

    /// Write every table of a snapshot
    pub fn write_database(&self, db: &Database) -> Result<Vec<PathBuf>, CsvError> {
        db.tables.iter().map(|t| self.write_table(t)).collect()
    }
}

/// Table names become file names; path separators are not allowed through
fn file_stem(table: &str) -> String {
    table
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}
