use std::sync::Arc;

use tracing::{debug, error, info};

use crate::extract::extract_link;
use crate::metrics::{self, MetricsContext, MetricsSink};
use crate::platform::MessageEvent;
use crate::providers::ProviderRegistry;
use crate::worker::{DispatchError, WorkerClient};

/// Terminal state of one message's trip through the pipeline.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Bot-authored message; nothing observed, nothing dispatched.
    Ignored,
    NoLink,
    Unsupported { provider: String },
    Dispatched { provider: String },
    Failed { provider: String, error: DispatchError },
}

/// Sequences extraction → classification → dispatch for each message event,
/// driving logs and metrics along the way. Holds no cross-message state, so
/// concurrent invocations for distinct events may interleave freely.
pub struct Pipeline {
    registry: ProviderRegistry,
    worker: WorkerClient,
    sink: Arc<dyn MetricsSink>,
}

impl Pipeline {
    pub fn new(registry: ProviderRegistry, worker: WorkerClient, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            registry,
            worker,
            sink,
        }
    }

    /// Handle one message event to its terminal state. Dispatch failures are
    /// contained here; the platform adapter has no caller to re-raise to.
    pub async fn handle_message(&self, event: &MessageEvent) -> DispatchOutcome {
        if event.from_bot {
            return DispatchOutcome::Ignored;
        }

        debug!(
            chat = %event.chat_label,
            channel = %event.channel_label,
            author = %event.author_label,
            "Message received"
        );

        let link = extract_link(&event.content);
        self.sink.increment_counter(
            metrics::MESSAGES_TOTAL,
            &[
                ("chat", event.chat_label.clone()),
                ("channel", event.channel_label.clone()),
                ("has_link", link.is_some().to_string()),
            ],
        );

        let Some(link) = link else {
            return DispatchOutcome::NoLink;
        };

        let classification = self.registry.classify(link);
        self.sink.increment_counter(
            metrics::LINK_DETECTIONS_TOTAL,
            &[
                ("provider", classification.provider.clone()),
                ("supported", classification.supported.to_string()),
            ],
        );

        if !classification.supported {
            debug!(provider = %classification.provider, url = %link, "Provider not supported");
            return DispatchOutcome::Unsupported {
                provider: classification.provider,
            };
        }

        info!(provider = %classification.provider, url = %link, "Detected provider link");

        let ctx = MetricsContext::start(
            self.sink.clone(),
            vec![("provider", classification.provider.clone())],
        );

        match self.worker.dispatch(link, &event.channel_id).await {
            Ok(()) => {
                info!(
                    url = %link,
                    channel_id = %event.channel_id,
                    elapsed_ms = ctx.elapsed().as_millis() as u64,
                    "Dispatched link to worker"
                );
                ctx.finish("success");
                DispatchOutcome::Dispatched {
                    provider: classification.provider,
                }
            }
            Err(error) => {
                error!(url = %link, kind = error.kind(), "Dispatch failed: {error}");
                self.sink.increment_counter(
                    metrics::API_ERRORS_TOTAL,
                    &[
                        ("endpoint", "videos".to_string()),
                        ("kind", error.kind().to_string()),
                    ],
                );
                ctx.finish("error");
                DispatchOutcome::Failed {
                    provider: classification.provider,
                    error,
                }
            }
        }
    }
}
