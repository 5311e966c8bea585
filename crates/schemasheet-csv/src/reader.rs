//! CSV → rows for the import half

use crate::format::{is_standard_header, HEADER};
use crate::CsvError;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A parsed table CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCsv {
    /// File stem of the CSV
    pub table_name: String,

    /// The file's own header row
    pub header: Vec<String>,

    /// Data rows, each padded to at least the standard width
    pub rows: Vec<Vec<String>>,
}

impl TableCsv {
    /// Number of data rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Field `index` of data row `row`, empty when out of range
    pub fn field(&self, row: usize, index: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// `.csv` files directly inside `dir`, sorted by file name ignoring case
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, CsvError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CsvError::fs(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CsvError::fs(dir, e))?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|p| {
        let name = p.file_name().map(|n| n.to_string_lossy().to_lowercase());
        (name, p.clone())
    });
    Ok(files)
}

/// Parse one table CSV
///
/// Records may be shorter than the header; missing fields read as empty.
pub fn read_table_csv(path: &Path) -> Result<TableCsv, CsvError> {
    let table_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| CsvError::InvalidPath(path.to_path_buf()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CsvError::csv(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::csv(path, e))?
        .iter()
        .map(String::from)
        .collect();

    if !header.is_empty() && !is_standard_header(&header) {
        warn!(path = %path.display(), "unexpected CSV header, laying out by position");
    }

    let width = header.len().max(HEADER.len());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CsvError::csv(path, e))?;
        let mut row: Vec<String> = record.iter().map(String::from).collect();
        if row.len() < width {
            row.resize(width, String::new());
        }
        rows.push(row);
    }

    Ok(TableCsv {
        table_name,
        header,
        rows,
    })
}
