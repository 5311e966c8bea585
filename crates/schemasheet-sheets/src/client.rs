//! Sheets v4 / Drive v3 access
//!
//! [`SheetsApi`] is the seam between the upload workflow and Google. The real
//! implementation, [`GoogleSheetsClient`], is a thin `reqwest` wrapper; every
//! call is a single JSON POST with a bearer token.
//!
//! Reference: https://developers.google.com/sheets/api/reference/rest

use crate::auth::TokenProvider;
use crate::model::{
    ApiErrorBody, BatchUpdateRequest, BatchUpdateResponse, Permission, Request, Spreadsheet,
};
use crate::SheetsError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";

/// Remote operations the uploader needs
#[async_trait::async_trait]
pub trait SheetsApi: Send + Sync {
    /// Create a spreadsheet; the response carries its id and sheet ids
    async fn create_spreadsheet(&self, spreadsheet: &Spreadsheet) -> Result<Spreadsheet, SheetsError>;

    /// Apply `requests` atomically to one spreadsheet
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError>;

    /// Grant `permission` on the spreadsheet file
    async fn share(&self, spreadsheet_id: &str, permission: &Permission) -> Result<(), SheetsError>;
}

/// HTTP client for the Google APIs
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    sheets_endpoint: String,
    drive_endpoint: String,
}

impl GoogleSheetsClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("schemasheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        Ok(Self {
            http,
            auth,
            sheets_endpoint: SHEETS_ENDPOINT.to_string(),
            drive_endpoint: DRIVE_ENDPOINT.to_string(),
        })
    }

    /// Point both APIs at another host (emulators, proxies)
    pub fn with_endpoints(mut self, sheets: impl Into<String>, drive: impl Into<String>) -> Self {
        self.sheets_endpoint = sheets.into();
        self.drive_endpoint = drive.into();
        self
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, SheetsError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let token = self.auth.access_token().await?;

        debug!(url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(classify(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| SheetsError::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("sheets_endpoint", &self.sheets_endpoint)
            .field("drive_endpoint", &self.drive_endpoint)
            .finish_non_exhaustive()
    }
}

/// Map a non-success response onto the error taxonomy
pub fn classify(status: StatusCode, body: &str) -> SheetsError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| {
            if b.error.status.is_empty() {
                b.error.message
            } else {
                format!("{}: {}", b.error.status, b.error.message)
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => SheetsError::RateLimited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SheetsError::Auth(message),
        _ => SheetsError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait::async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn create_spreadsheet(&self, spreadsheet: &Spreadsheet) -> Result<Spreadsheet, SheetsError> {
        let url = format!("{}/spreadsheets", self.sheets_endpoint);
        self.post(&url, spreadsheet).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError> {
        let url = format!("{}/spreadsheets/{}:batchUpdate", self.sheets_endpoint, spreadsheet_id);
        self.post(&url, &BatchUpdateRequest { requests }).await
    }

    async fn share(&self, spreadsheet_id: &str, permission: &Permission) -> Result<(), SheetsError> {
        let url = format!("{}/files/{}/permissions", self.drive_endpoint, spreadsheet_id);
        let _: serde_json::Value = self.post(&url, permission).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    #[test]
    fn classify_rate_limit() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, SheetsError::RateLimited(ref m) if m == "RESOURCE_EXHAUSTED: Quota exceeded"));
        assert!(err.is_retryable());
    }

    #[test]
    fn classify_forbidden() {
        let err = classify(StatusCode::FORBIDDEN, r#"{"error":{"code":403,"message":"denied"}}"#);
        assert!(matches!(err, SheetsError::Auth(ref m) if m == "denied"));
    }

    #[test]
    fn classify_plain_body() {
        let err = classify(StatusCode::BAD_GATEWAY, "upstream failed\n");
        assert!(matches!(
            err,
            SheetsError::Api { status: 502, ref message } if message == "upstream failed"
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn debug_hides_token() {
        let client = GoogleSheetsClient::new(Arc::new(StaticToken("secret".into())))
            .unwrap()
            .with_endpoints("http://localhost:1", "http://localhost:2");
        let debug = format!("{:?}", client);
        assert!(debug.contains("localhost:1"));
        assert!(!debug.contains("secret"));
    }
}
