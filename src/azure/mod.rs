//! Thin REST clients for the Azure Resource Manager APIs the exporter
//! consumes: subscription listing and per-subscription secure scores.
//!
//! Both APIs page their results through `nextLink`; [`fetch_all`]
//! walks a result set to completion before returning.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::{truncate_body, AuthError, Credential};

pub mod secure_scores;
pub mod subscriptions;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Error from an ARM call or its pagination.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ARM returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("credential error: {0}")]
    Auth(#[from] AuthError),
}

/// One page of an ARM list response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    // A path default keeps the derived impl free of a `T: Default` bound.
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default)]
    next_link: Option<String>,
}

/// GET `first_url` and every `nextLink` after it, concatenating the
/// pages' items. No early termination: a failed page fails the whole
/// listing.
async fn fetch_all<T: DeserializeOwned>(
    http: &reqwest::Client,
    credential: &Credential,
    first_url: String,
) -> Result<Vec<T>, FetchError> {
    let mut url = first_url;
    let mut items = Vec::new();
    loop {
        let token = credential.token().await?;
        let resp = http.get(&url).bearer_auth(&token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        let page: Page<T> = resp.json().await?;
        items.extend(page.value);
        match page.next_link {
            Some(next) if !next.is_empty() => url = next,
            _ => break,
        }
    }
    Ok(items)
}
