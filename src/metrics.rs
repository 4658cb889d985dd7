use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

// ── Metric names ───────────────────────────────────────────────────────────────

/// Chat messages seen by the pipeline, labeled `chat`, `channel`, `has_link`.
pub const MESSAGES_TOTAL: &str = "clipbot_messages_total";
/// Links detected in messages, labeled `provider`, `supported`.
pub const LINK_DETECTIONS_TOTAL: &str = "clipbot_link_detections_total";
/// Dispatches sent to the worker, labeled `status` (`success` / `error`).
pub const WORKER_REQUESTS_TOTAL: &str = "clipbot_worker_requests_total";
/// Worker response time histogram, labeled `status`.
pub const WORKER_RESPONSE_TIME_SECONDS: &str = "clipbot_worker_response_time_seconds";
/// Failed worker calls, labeled `endpoint` and failure `kind`.
pub const API_ERRORS_TOTAL: &str = "clipbot_api_errors_total";
/// 1 while the chat session is established.
pub const CONNECTED: &str = "clipbot_connected";
/// Chat session ready events.
pub const READY_EVENTS_TOTAL: &str = "clipbot_ready_events_total";
/// Process uptime, refreshed by a background task.
pub const UPTIME_SECONDS: &str = "clipbot_uptime_seconds";

const RESPONSE_TIME_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0];

// ── Sink ───────────────────────────────────────────────────────────────────────

/// Narrow recording capability the pipeline depends on. The production
/// implementation forwards to the global Prometheus recorder; tests substitute
/// an in-memory recorder.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &'static str, labels: &[(&'static str, String)]);
    fn set_gauge(&self, name: &'static str, value: f64, labels: &[(&'static str, String)]);
    fn observe_histogram(&self, name: &'static str, seconds: f64, labels: &[(&'static str, String)]);
}

/// Forwards every observation to the `metrics` facade, which the Prometheus
/// recorder installed in `main` picks up.
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn increment_counter(&self, name: &'static str, labels: &[(&'static str, String)]) {
        metrics::counter!(name, to_labels(labels)).increment(1);
    }

    fn set_gauge(&self, name: &'static str, value: f64, labels: &[(&'static str, String)]) {
        metrics::gauge!(name, to_labels(labels)).set(value);
    }

    fn observe_histogram(&self, name: &'static str, seconds: f64, labels: &[(&'static str, String)]) {
        metrics::histogram!(name, to_labels(labels)).record(seconds);
    }
}

fn to_labels(labels: &[(&'static str, String)]) -> Vec<metrics::Label> {
    labels
        .iter()
        .map(|(k, v)| metrics::Label::new(*k, v.clone()))
        .collect()
}

/// Install the global Prometheus recorder. Called once at startup; the
/// returned handle renders the text exposition for `/metrics`.
pub fn init_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(WORKER_RESPONSE_TIME_SECONDS.to_string()),
            RESPONSE_TIME_BUCKETS,
        )
        .context("Failed to configure histogram buckets")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

// ── Per-dispatch context ───────────────────────────────────────────────────────

/// Measurement handle bound to one in-flight dispatch. `finish` consumes the
/// context, recording one duration observation and one outcome increment, so
/// a double finish cannot compile; every exit path after `start` must call it.
pub struct MetricsContext {
    start: Instant,
    labels: Vec<(&'static str, String)>,
    sink: Arc<dyn MetricsSink>,
}

impl MetricsContext {
    pub fn start(sink: Arc<dyn MetricsSink>, labels: Vec<(&'static str, String)>) -> Self {
        Self {
            start: Instant::now(),
            labels,
            sink,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self, outcome: &str) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let mut labels = self.labels;
        labels.push(("status", outcome.to_string()));

        self.sink
            .observe_histogram(WORKER_RESPONSE_TIME_SECONDS, elapsed, &labels);
        self.sink.increment_counter(WORKER_REQUESTS_TOTAL, &labels);
    }
}

// ── Test recorder ──────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[test]
    fn test_finish_records_one_observation_and_one_increment() {
        let sink = Arc::new(RecordingSink::new());
        let ctx = MetricsContext::start(
            sink.clone() as Arc<dyn MetricsSink>,
            vec![("provider", "instagram.com".to_string())],
        );
        ctx.finish("success");

        assert_eq!(sink.histogram_count(WORKER_RESPONSE_TIME_SECONDS), 1);
        assert_eq!(
            sink.counter_count_with(WORKER_REQUESTS_TOTAL, "status", "success"),
            1
        );
        // Labels captured at start ride along.
        assert_eq!(
            sink.counter_count_with(WORKER_REQUESTS_TOTAL, "provider", "instagram.com"),
            1
        );
    }

    #[test]
    fn test_error_outcome_is_tagged() {
        let sink = Arc::new(RecordingSink::new());
        let ctx = MetricsContext::start(sink.clone() as Arc<dyn MetricsSink>, Vec::new());
        ctx.finish("error");

        assert_eq!(
            sink.counter_count_with(WORKER_REQUESTS_TOTAL, "status", "error"),
            1
        );
        assert_eq!(
            sink.counter_count_with(WORKER_REQUESTS_TOTAL, "status", "success"),
            0
        );
    }
}
