//! One-shot subscription discovery.
//!
//! Runs exactly once at startup, before any worker or the endpoint is
//! up. The resulting directory is immutable for the process lifetime —
//! there is no re-discovery loop, a restart picks up new subscriptions.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::azure::subscriptions::SubscriptionsClient;

/// Enumerate every subscription visible to the credential and map its
/// identifier to its display name. Any listing or pagination error is
/// fatal to startup.
pub async fn discover(client: &SubscriptionsClient) -> Result<BTreeMap<String, String>> {
    let subs = client
        .list_all()
        .await
        .context("Subscription enumeration failed")?;

    let mut directory = BTreeMap::new();
    for sub in subs {
        info!(
            subscription_id = %sub.subscription_id,
            display_name = %sub.display_name,
            "Discovered subscription"
        );
        // Display names become the metric label; a duplicate means two
        // subscriptions will write the same series.
        if directory.values().any(|name| name == &sub.display_name) {
            warn!(
                display_name = %sub.display_name,
                "Duplicate display name — secure score series will collide"
            );
        }
        directory.insert(sub.subscription_id, sub.display_name);
    }
    Ok(directory)
}
