//! Subscription listing client.

use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_all, FetchError, DEFAULT_ENDPOINT};
use crate::auth::Credential;

const API_VERSION: &str = "2020-01-01";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    pub display_name: String,
}

pub struct SubscriptionsClient {
    http: reqwest::Client,
    credential: Arc<Credential>,
    endpoint: String,
}

impl SubscriptionsClient {
    pub fn new(credential: Arc<Credential>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the ARM endpoint (tests point this at a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// List every subscription visible to the credential, following
    /// pagination to completion.
    pub async fn list_all(&self) -> Result<Vec<Subscription>, FetchError> {
        let url = format!(
            "{}/subscriptions?api-version={}",
            self.endpoint, API_VERSION
        );
        fetch_all(&self.http, &self.credential, url).await
    }
}
