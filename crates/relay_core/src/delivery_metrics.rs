//! Metrics recording for inbound webhooks and outbound notifications.

use std::fmt;
use std::time::Duration;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

#[cfg(test)]
#[path = "delivery_metrics_tests.rs"]
mod tests;

/// Final outcome of one inbound webhook request, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Delivered,
    Acknowledged,
    MethodNotAllowed,
    Misconfigured,
    Unauthorized,
    BodyReadFailed,
    MalformedPayload,
    DispatchFailed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Delivered => "delivered",
            WebhookOutcome::Acknowledged => "acknowledged",
            WebhookOutcome::MethodNotAllowed => "method_not_allowed",
            WebhookOutcome::Misconfigured => "misconfigured",
            WebhookOutcome::Unauthorized => "unauthorized",
            WebhookOutcome::BodyReadFailed => "body_read_failed",
            WebhookOutcome::MalformedPayload => "malformed_payload",
            WebhookOutcome::DispatchFailed => "dispatch_failed",
        }
    }
}

impl fmt::Display for WebhookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstraction for recording relay metrics.
///
/// # Thread Safety
/// All implementations MUST be thread-safe (Send + Sync).
pub trait DeliveryMetrics: Send + Sync {
    /// Records the outcome of an inbound webhook request.
    fn record_webhook(&self, outcome: WebhookOutcome);

    /// Records a notification the chat API accepted.
    fn record_delivery_success(&self, elapsed: Duration);

    /// Records a notification that could not be delivered.
    fn record_delivery_failure(&self, elapsed: Duration);
}

/// Prometheus metrics collector.
///
/// # Metrics
/// - `relay_webhooks_total{outcome}` (Counter)
/// - `relay_notifications_sent_total` (Counter)
/// - `relay_notifications_failed_total` (Counter)
/// - `relay_notification_duration_seconds` (Histogram)
pub struct PrometheusDeliveryMetrics {
    webhooks: IntCounterVec,
    sent: IntCounter,
    failed: IntCounter,
    duration: Histogram,
}

impl PrometheusDeliveryMetrics {
    /// Creates the collectors and registers them with `registry`.
    ///
    /// # Errors
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let webhooks = IntCounterVec::new(
            Opts::new("relay_webhooks_total", "Inbound webhook requests by outcome"),
            &["outcome"],
        )?;
        let sent = IntCounter::new(
            "relay_notifications_sent_total",
            "Notifications accepted by the chat API",
        )?;
        let failed = IntCounter::new(
            "relay_notifications_failed_total",
            "Notifications that could not be delivered",
        )?;
        let duration = Histogram::with_opts(
            HistogramOpts::new(
                "relay_notification_duration_seconds",
                "Time spent delivering a notification",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(webhooks.clone()))?;
        registry.register(Box::new(sent.clone()))?;
        registry.register(Box::new(failed.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            webhooks,
            sent,
            failed,
            duration,
        })
    }
}

impl DeliveryMetrics for PrometheusDeliveryMetrics {
    fn record_webhook(&self, outcome: WebhookOutcome) {
        self.webhooks.with_label_values(&[outcome.as_str()]).inc();
    }

    fn record_delivery_success(&self, elapsed: Duration) {
        self.sent.inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    fn record_delivery_failure(&self, elapsed: Duration) {
        self.failed.inc();
        self.duration.observe(elapsed.as_secs_f64());
    }
}

/// No-op metrics implementation for testing or when metrics are disabled.
#[derive(Debug, Default)]
pub struct NoOpDeliveryMetrics;

impl NoOpDeliveryMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl DeliveryMetrics for NoOpDeliveryMetrics {
    fn record_webhook(&self, _outcome: WebhookOutcome) {}
    fn record_delivery_success(&self, _elapsed: Duration) {}
    fn record_delivery_failure(&self, _elapsed: Duration) {}
}
