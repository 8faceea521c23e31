//! Secure score gauge registry.
//!
//! Owns an explicit (non-global) Prometheus registry with one series
//! per subscription display name in each family. `GaugeVec` is
//! internally synchronized, so refresh workers write concurrently
//! without any locking here; last write wins per series.

use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "azure_security_center";

/// Label carries the subscription display name (kept as
/// `subscription_id` for wire compatibility with existing dashboards).
const LABEL: &str = "subscription_id";

pub struct ScoreMetrics {
    registry: Registry,
    point: GaugeVec,
    percentage: GaugeVec,
    refresh_failures: IntCounterVec,
}

impl ScoreMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let point = GaugeVec::new(
            Opts::new(
                "secure_score_point",
                "Azure Security Center Secure Score as point",
            )
            .namespace(NAMESPACE),
            &[LABEL],
        )?;
        let percentage = GaugeVec::new(
            Opts::new(
                "secure_score_percentage",
                "Azure Security Center Secure Score as percentage",
            )
            .namespace(NAMESPACE),
            &[LABEL],
        )?;
        let refresh_failures = IntCounterVec::new(
            Opts::new(
                "secure_score_refresh_failures_total",
                "Refresh cycles that failed after exhausting retries",
            )
            .namespace(NAMESPACE),
            &[LABEL],
        )?;

        registry.register(Box::new(point.clone()))?;
        registry.register(Box::new(percentage.clone()))?;
        registry.register(Box::new(refresh_failures.clone()))?;

        Ok(Self {
            registry,
            point,
            percentage,
            refresh_failures,
        })
    }

    pub fn set_point(&self, subscription_name: &str, value: f64) {
        self.point.with_label_values(&[subscription_name]).set(value);
    }

    pub fn set_percentage(&self, subscription_name: &str, value: f64) {
        self.percentage
            .with_label_values(&[subscription_name])
            .set(value);
    }

    pub fn inc_refresh_failure(&self, subscription_name: &str) {
        self.refresh_failures
            .with_label_values(&[subscription_name])
            .inc();
    }

    /// Encode the current snapshot in the Prometheus text exposition
    /// format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
