//! Azure Security Center secure score exporter.
//!
//! Discovers the subscriptions visible to a service principal once at
//! startup, refreshes each subscription's secure score on a fixed
//! five-minute cycle, and republishes the scores as Prometheus gauges
//! on `:8080/metrics`.
//!
//! Pipeline: credential → subscription discovery → one refresh worker
//! per subscription → shared gauge registry → scrape endpoint.

pub mod auth;
pub mod azure;
pub mod discovery;
pub mod metrics;
pub mod poller;
pub mod server;
