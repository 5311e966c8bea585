//! OAuth access tokens for the Sheets and Drive APIs
//!
//! [`ServiceAccountAuth`] exchanges a service-account key file for bearer
//! tokens via `yup-oauth2`, which caches and refreshes them.

use crate::SheetsError;
use std::path::Path;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::ServiceAccountAuthenticator;

/// Scopes requested for every token: spreadsheet edits and Drive sharing
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Source of bearer tokens
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// Service-account credentials loaded from a JSON key file
pub struct ServiceAccountAuth {
    authenticator: DefaultAuthenticator,
    client_email: String,
}

impl ServiceAccountAuth {
    pub async fn from_key_file(path: &Path) -> Result<Self, SheetsError> {
        let key = yup_oauth2::read_service_account_key(path).await.map_err(|e| {
            SheetsError::Auth(format!("Cannot read service account key {}: {}", path.display(), e))
        })?;
        let client_email = key.client_email.clone();

        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| SheetsError::Auth(format!("Cannot build authenticator: {}", e)))?;

        Ok(Self { authenticator, client_email })
    }

    /// Identity the spreadsheet is created as
    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let token = self
            .authenticator
            .token(SCOPES)
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| SheetsError::Auth("token response carried no access token".to_string()))
    }
}

/// A fixed token, for callers that obtain one out of band
#[derive(Clone)]
pub struct StaticToken(pub String);

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}
