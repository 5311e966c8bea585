//! Google Sheets rendering of table CSVs
//!
//! Turns a directory of table CSVs into one spreadsheet: a formatted sheet per
//! table plus an `index` sheet linking to each of them.
//!
//! ## Layers
//!
//! - [`layout`]: pure translation of a [`schemasheet_csv::TableCsv`] into batch-update requests
//! - [`client`]: the [`SheetsApi`] trait and its HTTP implementation
//! - [`uploader`]: the create / share / add-sheet / index workflow
//! - [`mock`]: a recording [`SheetsApi`] for tests

pub mod auth;
pub mod client;
pub mod layout;
pub mod mock;
pub mod model;
pub mod retry;
pub mod uploader;

pub use auth::{ServiceAccountAuth, StaticToken, TokenProvider, SCOPES};
pub use client::{GoogleSheetsClient, SheetsApi};
pub use layout::{
    index_requests, table_sheet_cells, table_sheet_requests, CellValue, LayoutCell, SheetEntry,
};
pub use mock::{MockOp, MockSheetsApi};
pub use model::{Permission, Request};
pub use retry::{Pacer, RetryPolicy};
pub use uploader::{SheetsUploader, SkippedSheet, UploadOptions, UploadOutcome};

use schemasheet_csv::CsvError;

/// Errors raised while talking to Google APIs or reading the CSVs to upload
#[derive(Debug, Clone, thiserror::Error)]
pub enum SheetsError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl SheetsError {
    /// Rate limits and server-side failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Rejected before the request was applied
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

impl From<CsvError> for SheetsError {
    fn from(error: CsvError) -> Self {
        Self::Csv(error.to_string())
    }
}

impl From<std::io::Error> for SheetsError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
