//! Google Sheets v4 client (read-only)
//!
//! Authenticates as a service account: a short-lived RS256 JWT is exchanged
//! for a bearer token, which is cached until shortly before it expires.
//! Failures are reported once and never retried.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::SheetSource;
use crate::error::{FunnelError, FunnelResult};
use crate::types::Grid;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// How the client authenticates against the Sheets API
#[derive(Clone)]
pub enum Credentials {
    /// Service-account email and PEM private key
    ServiceAccount {
        client_email: String,
        private_key: String,
    },
    /// Pre-issued OAuth bearer token
    AccessToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccount { client_email, .. } => f
                .debug_struct("ServiceAccount")
                .field("client_email", client_email)
                .field("private_key", &"<redacted>")
                .finish(),
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Sheets API client bound to one spreadsheet
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    credentials: Credentials,
    signing_key: Option<EncodingKey>,
    api_base: String,
    token_uri: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    /// Build a client. An unreadable private key is a configuration error.
    pub fn new(spreadsheet_id: impl Into<String>, credentials: Credentials) -> FunnelResult<Self> {
        let signing_key = match &credentials {
            Credentials::ServiceAccount { private_key, .. } => Some(
                EncodingKey::from_rsa_pem(private_key.as_bytes())
                    .map_err(|e| FunnelError::Config(format!("invalid private key: {}", e)))?,
            ),
            Credentials::AccessToken(_) => None,
        };

        Ok(Self {
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            credentials,
            signing_key,
            api_base: DEFAULT_API_BASE.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Point the client at different API and token endpoints.
    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_uri: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.token_uri = token_uri.into();
        self
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}` with the range
    /// percent-encoded as a single path segment.
    pub fn values_url(&self, range: &str) -> FunnelResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| FunnelError::Config(format!("invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FunnelError::Config(format!("API base cannot hold a path: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    fn signed_assertion(&self, client_email: &str, now: DateTime<Utc>) -> FunnelResult<String> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| FunnelError::Config("no signing key for service account".to_string()))?;
        let iat = now.timestamp();
        let claims = Claims {
            iss: client_email,
            scope: SHEETS_READONLY_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
            .map_err(|e| FunnelError::Config(format!("could not sign token request: {}", e)))
    }

    async fn access_token(&self) -> FunnelResult<String> {
        let client_email = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount { client_email, .. } => client_email,
        };

        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = self.signed_assertion(client_email, now)?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| FunnelError::Fetch(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FunnelError::Fetch(format!(
                "token request rejected ({}): {}",
                status,
                upstream_message(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FunnelError::Fetch(format!("malformed token response: {}", e)))?;
        info!(expires_in = token.expires_in, "obtained Sheets access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn read_range(&self, range: &str) -> FunnelResult<Grid> {
        let url = self.values_url(range)?;
        let token = self.access_token().await?;

        debug!(range, "fetching sheet range");
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FunnelError::Fetch(format!("request for {} failed: {}", range, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FunnelError::Fetch(format!(
                "reading {} failed ({}): {}",
                range,
                status,
                upstream_message(&body)
            )));
        }

        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| FunnelError::Fetch(format!("malformed values response: {}", e)))?;

        let grid: Grid = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        info!(range, rows = grid.len(), "fetched sheet range");
        Ok(grid)
    }
}

/// Render a JSON cell the way it would appear formatted in the sheet.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

/// Pull the human-readable part out of a Google error body.
///
/// The Sheets API answers `{"error": {"message": ...}}`, the token
/// endpoint `{"error": "...", "error_description": ...}`.
fn upstream_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    json.pointer("/error/message")
        .or_else(|| json.get("error_description"))
        .or_else(|| json.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
