// Backend and probe traits, plus the attempt status side channel

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::errors::ExtractionError;
use super::models::{AttemptStatus, ExtractionRequest, ExtractionResult};

/// Extraction/download backend. Treated as an opaque capability: one call
/// fetches one format selection and reports what it produced.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    async fn extract(&self, request: &ExtractionRequest)
        -> Result<ExtractionResult, ExtractionError>;
}

/// Media inspection used when backend metadata carries no height
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe_height(&self, path: &Path) -> Option<u32>;
}

/// Probe that never knows anything
pub struct NoProbe;

#[async_trait]
impl MediaProbe for NoProbe {
    async fn probe_height(&self, _path: &Path) -> Option<u32> {
        None
    }
}

/// Attempt status emitter.
///
/// Every status goes to the `attempt` tracing target; a channel can be
/// attached for programmatic observers. Statuses are diagnostics only.
#[derive(Debug, Clone, Default)]
pub struct ProgressEmitter {
    sender: Option<UnboundedSender<AttemptStatus>>,
}

impl ProgressEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(sender: UnboundedSender<AttemptStatus>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn emit(&self, status: AttemptStatus) {
        info!(
            target: "attempt",
            mode = status.mode,
            attempt = status.attempt,
            total = status.total,
            client = %status.client,
            auth = %status.auth,
            outcome = status.outcome,
            retryable = status.retryable,
            detail = status.detail.as_deref().unwrap_or(""),
            "Attempt finished"
        );
        if let Some(sender) = &self.sender {
            // Receiver may be gone; statuses are best effort
            let _ = sender.send(status);
        }
    }
}
