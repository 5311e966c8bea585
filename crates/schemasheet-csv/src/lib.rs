//! CSV files for table documentation
//!
//! The export half writes one `<table>.csv` per table into a freshly created
//! directory; the import half lists and parses those files again.

pub mod format;
pub mod output_dir;
pub mod reader;
pub mod writer;

pub use format::{column_record, flag, ABSENT, HEADER, PRESENT};
pub use output_dir::create_unique_dir;
pub use reader::{list_csv_files, read_table_csv, TableCsv};
pub use writer::CsvWriter;

use std::path::PathBuf;

/// Errors raised while reading or writing CSV trees
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("Filesystem error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

impl CsvError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}
