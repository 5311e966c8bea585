//! CSV directory → spreadsheet workflow
//!
//! 1. create the spreadsheet (first sheet titled `index`, or `_index` when a
//!    table already uses that name)
//! 2. grant writer access to the configured user
//! 3. per CSV file, in name order: add a sheet, then submit its layout
//! 4. write the index links
//!
//! Steps 1, 2 and 4 are fatal on error. A failure in step 3 skips that table
//! and the upload carries on.
//!
//! `addSheet` is only retried on 429: a 5xx may arrive after the sheet was
//! created, and repeating the add would then fail on the duplicate title.

use crate::client::SheetsApi;
use crate::layout::{index_requests, table_sheet_requests, SheetEntry};
use crate::model::{AddSheetRequest, Permission, Request, SheetProperties, Spreadsheet};
use crate::retry::{Pacer, RetryPolicy};
use crate::SheetsError;
use schemasheet_csv::{list_csv_files, read_table_csv};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Title of the sheet holding the table links
pub const INDEX_SHEET_TITLE: &str = "index";

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Email granted writer access
    pub share_with: String,

    /// Minimum time between two layout submissions
    pub batch_interval: Duration,

    pub retry: RetryPolicy,
}

impl UploadOptions {
    pub fn new(share_with: impl Into<String>) -> Self {
        Self {
            share_with: share_with.into(),
            batch_interval: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A table left out of the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSheet {
    pub table: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub spreadsheet_id: String,
    pub spreadsheet_url: Option<String>,
    pub index_sheet_id: i64,
    pub uploaded: Vec<SheetEntry>,
    pub skipped: Vec<SkippedSheet>,
}

impl UploadOutcome {
    /// Browser URL, derived from the id when the API did not return one
    pub fn url(&self) -> String {
        self.spreadsheet_url.clone().unwrap_or_else(|| {
            format!("https://docs.google.com/spreadsheets/d/{}/edit", self.spreadsheet_id)
        })
    }
}

/// Uploads CSV trees through a [`SheetsApi`]
pub struct SheetsUploader {
    api: Arc<dyn SheetsApi>,
    options: UploadOptions,
}

impl SheetsUploader {
    pub fn new(api: Arc<dyn SheetsApi>, options: UploadOptions) -> Self {
        Self { api, options }
    }

    /// Upload every `.csv` directly inside `dir` into a new spreadsheet
    pub async fn upload_directory(&self, dir: &Path) -> Result<UploadOutcome, SheetsError> {
        let files = list_csv_files(dir)?;
        let title = spreadsheet_title(dir);
        let api = &*self.api;
        let retry = &self.options.retry;

        let tables: Vec<String> = files.iter().map(|p| table_name(p)).collect();
        let index_title = index_sheet_title(&tables);
        if index_title != INDEX_SHEET_TITLE {
            warn!(index_title = %index_title, "a table is named {}, renaming the index sheet", INDEX_SHEET_TITLE);
        }

        let body = Spreadsheet::new(title.as_str(), index_title.as_str());
        let created = retry
            .run("spreadsheets.create", || api.create_spreadsheet(&body))
            .await?;
        let spreadsheet_id = created.spreadsheet_id.clone().ok_or_else(|| {
            SheetsError::InvalidResponse("spreadsheets.create returned no spreadsheetId".to_string())
        })?;
        let index_sheet_id = created.first_sheet_id();
        info!(%spreadsheet_id, %title, files = files.len(), "created spreadsheet");

        let id = spreadsheet_id.as_str();
        let permission = Permission::writer(self.options.share_with.as_str());
        retry
            .run("permissions.create", || api.share(id, &permission))
            .await?;
        info!(email = %permission.email_address, "granted writer access");

        let mut pacer = Pacer::new(self.options.batch_interval);
        let mut uploaded = Vec::new();
        let mut skipped = Vec::new();

        for path in &files {
            let table = table_name(path);
            match self.upload_table(id, path, &mut pacer).await {
                Ok(entry) => {
                    info!(table = %entry.title, sheet_id = entry.sheet_id, rows = entry.rows, "uploaded sheet");
                    uploaded.push(entry);
                }
                Err(error) => {
                    warn!(%table, %error, "skipping sheet");
                    skipped.push(SkippedSheet {
                        table,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let links = index_requests(index_sheet_id, &uploaded);
        if links.is_empty() {
            info!("no sheets uploaded, index left empty");
        } else {
            retry
                .run("spreadsheets.batchUpdate", || api.batch_update(id, links.clone()))
                .await?;
            info!(entries = links.len(), "wrote index");
        }

        Ok(UploadOutcome {
            spreadsheet_url: created.spreadsheet_url,
            spreadsheet_id,
            index_sheet_id,
            uploaded,
            skipped,
        })
    }

    async fn upload_table(
        &self,
        spreadsheet_id: &str,
        path: &Path,
        pacer: &mut Pacer,
    ) -> Result<SheetEntry, SheetsError> {
        let api = &*self.api;
        let retry = &self.options.retry;
        let table = read_table_csv(path)?;

        let add = vec![Request::AddSheet(AddSheetRequest {
            properties: SheetProperties::titled(table.table_name.as_str()),
        })];
        let reply = retry
            .run_when("addSheet", SheetsError::is_rate_limit, || {
                api.batch_update(spreadsheet_id, add.clone())
            })
            .await?;
        let sheet_id = reply.added_sheet_id().ok_or_else(|| {
            SheetsError::InvalidResponse(format!("addSheet for {} returned no sheetId", table.table_name))
        })?;

        let requests = table_sheet_requests(sheet_id, &table);
        pacer.ready().await;
        retry
            .run("spreadsheets.batchUpdate", || api.batch_update(spreadsheet_id, requests.clone()))
            .await?;

        Ok(SheetEntry {
            title: table.table_name,
            sheet_id,
            rows: table.rows.len(),
        })
    }
}

/// `index`, prefixed with `_` until no table title uses it
///
/// Sheet titles are unique regardless of case.
fn index_sheet_title(tables: &[String]) -> String {
    let mut title = INDEX_SHEET_TITLE.to_string();
    while tables.iter().any(|t| t.eq_ignore_ascii_case(&title)) {
        title.insert(0, '_');
    }
    title
}

/// Final path component of the CSV directory
fn spreadsheet_title(dir: &Path) -> String {
    dir.file_name()
        .or_else(|| dir.components().last().map(|c| c.as_os_str()))
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
