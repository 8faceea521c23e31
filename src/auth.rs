//! Azure AD credential — client-credentials token source for ARM.
//!
//! Reads the service principal from the same environment variables the
//! Azure SDKs use (`AZURE_TENANT_ID`, `AZURE_CLIENT_ID`,
//! `AZURE_CLIENT_SECRET`) and exchanges them for a bearer token scoped
//! to the management plane. The token is cached in-process and
//! refreshed shortly before expiry; concurrent callers share one cache.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

const TOKEN_SCOPE: &str = "https://management.azure.com/.default";

/// Refresh the cached token once it is within this margin of expiry.
const EXPIRY_MARGIN_SECS: i64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Shared credential backing both ARM clients.
pub struct Credential {
    http: reqwest::Client,
    authority: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl Credential {
    /// Load the service principal from the environment. Missing
    /// variables are a startup error — the exporter cannot run without
    /// a credential.
    pub fn from_env() -> Result<Self> {
        let tenant_id =
            std::env::var("AZURE_TENANT_ID").context("AZURE_TENANT_ID is not set")?;
        let client_id =
            std::env::var("AZURE_CLIENT_ID").context("AZURE_CLIENT_ID is not set")?;
        let client_secret =
            std::env::var("AZURE_CLIENT_SECRET").context("AZURE_CLIENT_SECRET is not set")?;
        Ok(Self::new(tenant_id, client_id, client_secret))
    }

    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        }
    }

    /// Override the authority host (tests point this at a mock server).
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Return a bearer token for the management plane, refreshing the
    /// cached one if it is missing or close to expiry.
    pub async fn token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(tok) = cached.as_ref() {
            if tok.expires_at - Utc::now() > Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(tok.value.clone());
            }
        }

        let url = format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant_id);
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", TOKEN_SCOPE),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let tok: TokenResponse = resp.json().await?;
        let expires_at = Utc::now() + Duration::seconds(tok.expires_in);
        debug!(expires_at = %expires_at, "ARM token acquired");
        *cached = Some(CachedToken {
            value: tok.access_token.clone(),
            expires_at,
        });
        Ok(tok.access_token)
    }
}

/// Cap an error-response body for logging, backing up to a char
/// boundary so multi-byte UTF-8 never splits.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_BYTES: usize = 500;
    if body.len() <= MAX_BYTES {
        return body.to_string();
    }
    let mut end = MAX_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}
