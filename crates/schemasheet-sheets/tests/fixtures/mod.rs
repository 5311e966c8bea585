//! Test fixtures for upload integration tests
//!
//! Builds CSV trees the same way the export command does, so the upload tests
//! exercise real exported files.

#![allow(dead_code)]

use schemasheet_core::{Column, Database, Table};
use schemasheet_csv::CsvWriter;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn departments_table() -> Table {
    Table::new("departments", vec![
        Column::new("id", "int").primary_key(),
        Column::new("name", "varchar(100)").unique().with_nullable(false),
    ])
}

pub fn users_table() -> Table {
    Table::new("users", vec![
        Column::new("id", "int").primary_key(),
        Column::new("email", "varchar(255)").unique().with_nullable(false),
        Column::new("dept_id", "int").indexed().references("departments", "id"),
    ])
}

/// A temp root holding one exported directory named `name`
pub struct ExportTree {
    _root: TempDir,
    pub dir: PathBuf,
}

pub fn export_tree(name: &str, tables: Vec<Table>) -> ExportTree {
    let root = TempDir::new().unwrap();
    let dir = root.path().join(name);
    std::fs::create_dir(&dir).unwrap();

    CsvWriter::new(&dir)
        .write_database(&Database::new(name, tables))
        .unwrap();

    ExportTree { _root: root, dir }
}
