//! Recording Sheets API for testing
//!
//! Allocates sheet ids like the real service, rejects duplicate sheet titles,
//! and records every call so tests can inspect the exact request stream.
//! Failures can be queued per operation, pinned to the Nth batch update, or
//! pinned to a sheet title.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let api = Arc::new(MockSheetsApi::new());
//! api.push_failure(MockOp::Share, SheetsError::Auth("denied".into())).await;
//!
//! let uploader = SheetsUploader::new(api.clone(), options);
//! ```

use crate::client::SheetsApi;
use crate::model::{
    AddSheetResponse, BatchUpdateResponse, Permission, Reply, Request, SheetProperties, Spreadsheet,
};
use crate::SheetsError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Operation of the [`SheetsApi`] trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Create,
    BatchUpdate,
    Share,
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Create(Spreadsheet),
    BatchUpdate { spreadsheet_id: String, requests: Vec<Request> },
    Share { spreadsheet_id: String, permission: Permission },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<MockCall>,
    sheets: Vec<SheetProperties>,
    next_sheet_id: i64,
    failures: VecDeque<(MockOp, SheetsError)>,
    batch_failures: HashMap<usize, SheetsError>,
    batch_count: usize,
    rejected_titles: HashSet<String>,
}

/// Mock Sheets API for testing
#[derive(Debug, Clone)]
pub struct MockSheetsApi {
    spreadsheet_id: String,
    state: Arc<RwLock<State>>,
}

impl Default for MockSheetsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSheetsApi {
    pub const FIRST_SHEET_ID: i64 = 1000;

    pub fn new() -> Self {
        Self {
            spreadsheet_id: "mock-spreadsheet".to_string(),
            state: Arc::new(RwLock::new(State {
                next_sheet_id: Self::FIRST_SHEET_ID,
                ..State::default()
            })),
        }
    }

    /// Fail the next call of `op` with `error`
    ///
    /// Failures queue up in order; each is consumed by one call.
    pub async fn push_failure(&self, op: MockOp, error: SheetsError) {
        self.state.write().await.failures.push_back((op, error));
    }

    /// Fail batch update number `n` (1-based, counting every attempt)
    pub async fn fail_batch(&self, n: usize, error: SheetsError) {
        self.state.write().await.batch_failures.insert(n, error);
    }

    /// Reject every `addSheet` for `title` with a 400
    pub async fn reject_sheet(&self, title: impl Into<String>) {
        self.state.write().await.rejected_titles.insert(title.into());
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.state.read().await.calls.clone()
    }

    /// Requests of every recorded batch update, in call order
    pub async fn batches(&self) -> Vec<Vec<Request>> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::BatchUpdate { requests, .. } => Some(requests.clone()),
                _ => None,
            })
            .collect()
    }

    /// Sheets currently in the spreadsheet, index sheet first
    pub async fn sheets(&self) -> Vec<SheetProperties> {
        self.state.read().await.sheets.clone()
    }

    fn take_failure(state: &mut State, op: MockOp) -> Option<SheetsError> {
        let position = state.failures.iter().position(|(o, _)| *o == op)?;
        state.failures.remove(position).map(|(_, e)| e)
    }

    fn add_sheet(state: &mut State, properties: &SheetProperties) -> Result<Reply, SheetsError> {
        let title = properties.title.clone().unwrap_or_default();
        let duplicate = state
            .sheets
            .iter()
            .any(|s| s.title.as_deref() == Some(title.as_str()));

        if duplicate || state.rejected_titles.contains(&title) {
            return Err(SheetsError::Api {
                status: 400,
                message: format!("A sheet with the name \"{}\" cannot be added", title),
            });
        }

        let sheet_id = state.next_sheet_id;
        state.next_sheet_id += 1;

        let added = SheetProperties {
            sheet_id: Some(sheet_id),
            title: Some(title),
            index: Some(state.sheets.len() as u32),
        };
        state.sheets.push(added.clone());

        Ok(Reply {
            add_sheet: Some(AddSheetResponse { properties: added }),
        })
    }
}

#[async_trait::async_trait]
impl SheetsApi for MockSheetsApi {
    async fn create_spreadsheet(&self, spreadsheet: &Spreadsheet) -> Result<Spreadsheet, SheetsError> {
        let mut state = self.state.write().await;
        state.calls.push(MockCall::Create(spreadsheet.clone()));

        if let Some(error) = Self::take_failure(&mut state, MockOp::Create) {
            return Err(error);
        }

        let mut created = spreadsheet.clone();
        created.spreadsheet_id = Some(self.spreadsheet_id.clone());
        created.spreadsheet_url = Some(format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            self.spreadsheet_id
        ));
        if created.sheets.is_empty() {
            created.sheets.push(Default::default());
        }
        for (i, sheet) in created.sheets.iter_mut().enumerate() {
            sheet.properties.sheet_id = Some(i as i64);
            sheet.properties.index = Some(i as u32);
        }
        state.sheets = created.sheets.iter().map(|s| s.properties.clone()).collect();

        Ok(created)
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError> {
        let mut state = self.state.write().await;
        state.calls.push(MockCall::BatchUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            requests: requests.clone(),
        });

        state.batch_count += 1;
        let n = state.batch_count;
        if let Some(error) = state.batch_failures.remove(&n) {
            return Err(error);
        }
        if let Some(error) = Self::take_failure(&mut state, MockOp::BatchUpdate) {
            return Err(error);
        }

        let mut replies = Vec::with_capacity(requests.len());
        for request in &requests {
            match request {
                Request::AddSheet(add) => replies.push(Self::add_sheet(&mut state, &add.properties)?),
                _ => replies.push(Reply::default()),
            }
        }

        Ok(BatchUpdateResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            replies,
        })
    }

    async fn share(&self, spreadsheet_id: &str, permission: &Permission) -> Result<(), SheetsError> {
        let mut state = self.state.write().await;
        state.calls.push(MockCall::Share {
            spreadsheet_id: spreadsheet_id.to_string(),
            permission: permission.clone(),
        });

        match Self::take_failure(&mut state, MockOp::Share) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AddSheetRequest;

    fn add(title: &str) -> Vec<Request> {
        vec![Request::AddSheet(AddSheetRequest {
            properties: SheetProperties::titled(title),
        })]
    }

    #[tokio::test]
    async fn allocates_sheet_ids() {
        let api = MockSheetsApi::new();
        let created = api.create_spreadsheet(&Spreadsheet::new("app", "index")).await.unwrap();
        assert_eq!(created.first_sheet_id(), 0);

        let first = api.batch_update("mock-spreadsheet", add("users")).await.unwrap();
        let second = api.batch_update("mock-spreadsheet", add("orders")).await.unwrap();
        assert_eq!(first.added_sheet_id(), Some(MockSheetsApi::FIRST_SHEET_ID));
        assert_eq!(second.added_sheet_id(), Some(MockSheetsApi::FIRST_SHEET_ID + 1));
        assert_eq!(api.sheets().await.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let api = MockSheetsApi::new();
        api.create_spreadsheet(&Spreadsheet::new("app", "index")).await.unwrap();

        let err = api.batch_update("mock-spreadsheet", add("index")).await.unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn fails_numbered_batch() {
        let api = MockSheetsApi::new();
        api.create_spreadsheet(&Spreadsheet::new("app", "index")).await.unwrap();
        api.fail_batch(2, SheetsError::Api { status: 500, message: "boom".into() }).await;

        assert!(api.batch_update("mock-spreadsheet", add("a")).await.is_ok());
        assert!(api.batch_update("mock-spreadsheet", add("b")).await.is_err());
        assert!(api.batch_update("mock-spreadsheet", add("b")).await.is_ok());
        assert_eq!(api.batches().await.len(), 3);
    }

    #[tokio::test]
    async fn failures_are_consumed_in_order() {
        let api = MockSheetsApi::new();
        api.push_failure(MockOp::Share, SheetsError::RateLimited("1".into())).await;
        api.push_failure(MockOp::Share, SheetsError::Auth("2".into())).await;

        let permission = Permission::writer("a@example.com");
        assert!(matches!(api.share("x", &permission).await, Err(SheetsError::RateLimited(_))));
        assert!(matches!(api.share("x", &permission).await, Err(SheetsError::Auth(_))));
        assert!(api.share("x", &permission).await.is_ok());
        assert_eq!(api.calls().await.len(), 3);
    }
}
