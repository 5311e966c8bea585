//! Integration tests for the upload workflow
//!
//! Everything runs against `MockSheetsApi`; nothing reaches Google.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p schemasheet-sheets --test integration_tests
//! ```

mod fixtures;

use pretty_assertions::assert_eq;
use schemasheet_sheets::mock::MockCall;
use schemasheet_sheets::model::{ExtendedValue, Request};
use schemasheet_sheets::{
    MockOp, MockSheetsApi, RetryPolicy, SheetsError, SheetsUploader, UploadOptions,
};
use schemasheet_core::{Column, Table};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn options() -> UploadOptions {
    UploadOptions::new("docs@example.com")
        .with_batch_interval(Duration::ZERO)
        .with_retry(RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        })
}

fn uploader(api: &Arc<MockSheetsApi>) -> SheetsUploader {
    SheetsUploader::new(api.clone(), options())
}

/// Formula values of the index batch, in row order
fn index_formulas(batch: &[Request]) -> Vec<String> {
    batch
        .iter()
        .filter_map(|r| match r {
            Request::UpdateCells(u) => match &u.rows[0].values[0].user_entered_value {
                Some(ExtendedValue::FormulaValue(f)) => Some(f.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Sheet rows carrying a column-name cell, with the name
fn column_name_rows(batch: &[Request]) -> Vec<(u32, String)> {
    batch
        .iter()
        .filter_map(|r| match r {
            Request::RepeatCell(rc)
                if rc.range.start_column_index == 1
                    && rc.range.end_column_index == 4
                    && rc.range.start_row_index > 6 =>
            {
                match &rc.cell.user_entered_value {
                    Some(ExtendedValue::StringValue(s)) => Some((rc.range.start_row_index, s.clone())),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect()
}

// =============================================================================
// Workflow
// =============================================================================

#[tokio::test]
async fn test_upload_creates_shares_and_indexes() {
    let tree = fixtures::export_tree(
        "app",
        vec![fixtures::users_table(), fixtures::departments_table()],
    );
    let api = Arc::new(MockSheetsApi::new());

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert_eq!(outcome.spreadsheet_id, "mock-spreadsheet");
    assert_eq!(outcome.index_sheet_id, 0);
    assert!(outcome.skipped.is_empty());

    // Name order, ids as allocated
    let titles: Vec<_> = outcome.uploaded.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["departments", "users"]);
    assert_eq!(outcome.uploaded[1].rows, 3);

    let calls = api.calls().await;
    let MockCall::Create(created) = &calls[0] else {
        panic!("first call should create the spreadsheet");
    };
    assert_eq!(created.properties.title, "app");
    assert_eq!(created.sheets[0].properties.title.as_deref(), Some("index"));

    let MockCall::Share { permission, .. } = &calls[1] else {
        panic!("second call should share the spreadsheet");
    };
    assert_eq!(permission.role, "writer");
    assert_eq!(permission.grantee_type, "user");
    assert_eq!(permission.email_address, "docs@example.com");

    // add + layout per table, then the index
    let batches = api.batches().await;
    assert_eq!(batches.len(), 5);
    assert_eq!(
        index_formulas(&batches[4]),
        [
            format!("=HYPERLINK(\"#gid={}\",\"departments\")", outcome.uploaded[0].sheet_id),
            format!("=HYPERLINK(\"#gid={}\",\"users\")", outcome.uploaded[1].sheet_id),
        ]
    );

    let sheets: Vec<_> = api
        .sheets()
        .await
        .into_iter()
        .filter_map(|s| s.title)
        .collect();
    assert_eq!(sheets, ["index", "departments", "users"]);
}

#[tokio::test]
async fn test_reimport_keeps_rows_and_order() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());

    uploader(&api).upload_directory(&tree.dir).await.unwrap();

    let batches = api.batches().await;
    let layout = &batches[1];
    assert_eq!(
        column_name_rows(layout),
        [
            (7, "id".to_string()),
            (8, "email".to_string()),
            (9, "dept_id".to_string()),
        ]
    );
    assert!(layout.iter().all(|r| match r {
        Request::MergeCells(m) => m.range.sheet_id == MockSheetsApi::FIRST_SHEET_ID,
        Request::RepeatCell(rc) => rc.range.sheet_id == MockSheetsApi::FIRST_SHEET_ID,
        Request::UpdateBorders(b) => b.range.sheet_id == MockSheetsApi::FIRST_SHEET_ID,
        _ => false,
    }));
}

#[tokio::test]
async fn test_empty_directory_gives_empty_index() {
    let root = tempfile::TempDir::new().unwrap();
    let dir = root.path().join("empty_db");
    std::fs::create_dir(&dir).unwrap();
    let api = Arc::new(MockSheetsApi::new());

    let outcome = uploader(&api).upload_directory(&dir).await.unwrap();

    assert!(outcome.uploaded.is_empty());
    assert!(outcome.skipped.is_empty());
    assert!(api.batches().await.is_empty());
    assert_eq!(api.sheets().await.len(), 1);
}

#[tokio::test]
async fn test_table_named_index_keeps_its_name() {
    let tree = fixtures::export_tree(
        "app",
        vec![Table::new("index", vec![Column::new("id", "int").primary_key()])],
    );
    let api = Arc::new(MockSheetsApi::new());

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.uploaded[0].title, "index");

    let sheets: Vec<_> = api
        .sheets()
        .await
        .into_iter()
        .filter_map(|s| s.title)
        .collect();
    assert_eq!(sheets, ["_index", "index"]);
}

#[tokio::test(start_paused = true)]
async fn test_layout_batches_are_paced() {
    let tree = fixtures::export_tree(
        "app",
        vec![fixtures::users_table(), fixtures::departments_table()],
    );
    let api = Arc::new(MockSheetsApi::new());
    let uploader = SheetsUploader::new(api.clone(), UploadOptions::new("docs@example.com"));

    let start = Instant::now();
    let outcome = uploader.upload_directory(&tree.dir).await.unwrap();

    assert_eq!(outcome.uploaded.len(), 2);
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_secs(6));
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_rejected_sheet_is_skipped() {
    let tree = fixtures::export_tree(
        "app",
        vec![fixtures::users_table(), fixtures::departments_table()],
    );
    let api = Arc::new(MockSheetsApi::new());
    api.reject_sheet("departments").await;

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].table, "departments");
    assert_eq!(outcome.uploaded.len(), 1);
    assert_eq!(outcome.uploaded[0].title, "users");

    let batches = api.batches().await;
    let index = batches.last().unwrap();
    assert_eq!(index_formulas(index).len(), 1);
}

#[tokio::test]
async fn test_unreadable_csv_is_skipped() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    std::fs::write(tree.dir.join("broken.csv"), b"COLUMN_NAME\n\xff\xfe\n").unwrap();
    let api = Arc::new(MockSheetsApi::new());

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].table, "broken");
    assert_eq!(outcome.uploaded.len(), 1);
}

#[tokio::test]
async fn test_share_failure_is_fatal() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    api.push_failure(MockOp::Share, SheetsError::Auth("insufficient permissions".into()))
        .await;

    let err = uploader(&api).upload_directory(&tree.dir).await.unwrap_err();
    assert!(matches!(err, SheetsError::Auth(_)));
    assert!(api.batches().await.is_empty());
}

#[tokio::test]
async fn test_create_failure_is_fatal() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    api.push_failure(MockOp::Create, SheetsError::Api { status: 400, message: "bad".into() })
        .await;

    assert!(uploader(&api).upload_directory(&tree.dir).await.is_err());
    assert_eq!(api.calls().await.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    // addSheet rate limited, then the layout batch hits a 503
    api.fail_batch(1, SheetsError::RateLimited("quota".into())).await;
    api.fail_batch(3, SheetsError::Api { status: 503, message: "busy".into() }).await;

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert_eq!(outcome.uploaded.len(), 1);
    assert!(outcome.skipped.is_empty());
    // add x2, layout x2, index
    assert_eq!(api.batches().await.len(), 5);
}

#[tokio::test]
async fn test_add_sheet_server_error_is_not_retried() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    api.fail_batch(1, SheetsError::Api { status: 503, message: "busy".into() }).await;

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert!(outcome.uploaded.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].table, "users");
    assert_eq!(api.batches().await.len(), 1);
}

#[tokio::test]
async fn test_index_failure_is_fatal() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    // add, layout, then the index write
    api.fail_batch(3, SheetsError::Api { status: 400, message: "bad range".into() }).await;

    let err = uploader(&api).upload_directory(&tree.dir).await.unwrap_err();

    assert!(matches!(err, SheetsError::Api { status: 400, .. }));
    let batches = api.batches().await;
    assert_eq!(batches.len(), 3);
    assert_eq!(index_formulas(&batches[2]).len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_skip_the_sheet() {
    let tree = fixtures::export_tree("app", vec![fixtures::users_table()]);
    let api = Arc::new(MockSheetsApi::new());
    for _ in 0..3 {
        api.push_failure(MockOp::BatchUpdate, SheetsError::RateLimited("quota".into()))
            .await;
    }

    let outcome = uploader(&api).upload_directory(&tree.dir).await.unwrap();

    assert!(outcome.uploaded.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].reason.contains("Rate limited"));
}

#[tokio::test]
async fn test_missing_directory_is_fatal() {
    let api = Arc::new(MockSheetsApi::new());
    let err = uploader(&api)
        .upload_directory(std::path::Path::new("/nonexistent/schemasheet"))
        .await
        .unwrap_err();

    assert!(matches!(err, SheetsError::Csv(_)));
    assert!(api.calls().await.is_empty());
}
