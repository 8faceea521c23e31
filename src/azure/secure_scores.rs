//! Secure score client — one instance per subscription.
//!
//! Bound to a subscription at startup; no network call happens until
//! the first refresh. Score values are passed through exactly as the
//! API reports them, no range validation.

use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_all, FetchError, DEFAULT_ENDPOINT};
use crate::auth::Credential;

const API_VERSION: &str = "2020-01-01-preview";

#[derive(Debug, Clone, Deserialize)]
pub struct SecureScoreItem {
    pub name: String,
    pub properties: SecureScoreProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecureScoreProperties {
    pub score: ScoreDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreDetails {
    pub current: f64,
    pub percentage: f64,
}

pub struct SecureScoresClient {
    http: reqwest::Client,
    credential: Arc<Credential>,
    endpoint: String,
    subscription_id: String,
}

impl SecureScoresClient {
    pub fn new(credential: Arc<Credential>, subscription_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: subscription_id.into(),
        }
    }

    /// Override the ARM endpoint (tests point this at a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// List the bound subscription's secure scores, following
    /// pagination to completion.
    pub async fn list_all(&self) -> Result<Vec<SecureScoreItem>, FetchError> {
        let url = format!(
            "{}/subscriptions/{}/providers/Microsoft.Security/secureScores?api-version={}",
            self.endpoint, self.subscription_id, API_VERSION
        );
        fetch_all(&self.http, &self.credential, url).await
    }
}
