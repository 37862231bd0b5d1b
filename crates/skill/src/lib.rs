mod config;
mod resolver;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Map;
use subway_core::{welcome_speechlet, IntentPayload, PlatformEvent, RequestKind, ResponseEnvelope};
use subway_observability::SkillMetrics;
use subway_status::{BuildError, HttpStatusClient, StatusSource};
use tracing::{info, instrument};

pub use config::{ConfigError, SkillConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_INVOCATION_DEADLINE_MS};
pub use resolver::{resolve_train_status, Resolution};

pub const GET_TRAIN_STATUS_INTENT: &str = "GetTrainStatus";

/// Failures that point at a configuration or integration defect. They go to the host,
/// never to the user.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("unrecognized intent {0:?}")]
    UnrecognizedIntent(String),
    #[error("unrecognized request type {0:?}")]
    UnrecognizedRequestType(String),
    #[error("intent request carries no intent")]
    MissingIntent,
    #[error("invocation exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

#[derive(Clone)]
pub struct TrainStatusSkill<S>
where
    S: StatusSource,
{
    source: Arc<S>,
    metrics: Arc<SkillMetrics>,
    deadline: Duration,
}

impl TrainStatusSkill<HttpStatusClient> {
    pub fn from_config(config: SkillConfig, metrics: Arc<SkillMetrics>) -> Result<Self, BuildError> {
        let client = HttpStatusClient::new(config.status)?;
        Ok(Self::new(Arc::new(client), metrics, config.invocation_deadline))
    }
}

impl<S> TrainStatusSkill<S>
where
    S: StatusSource,
{
    pub fn new(source: Arc<S>, metrics: Arc<SkillMetrics>, deadline: Duration) -> Self {
        Self {
            source,
            metrics,
            deadline,
        }
    }

    pub fn metrics(&self) -> &Arc<SkillMetrics> {
        &self.metrics
    }

    /// Routes one platform event and returns its envelope, or `None` for requests that
    /// only need an acknowledgement.
    ///
    /// The whole invocation is bounded by the configured deadline; expiry is reported as
    /// [`SkillError::DeadlineExceeded`] instead of a partial response.
    #[instrument(
        skip(self, event),
        fields(request_id = %event.request.request_id, session_id = %event.session.session_id)
    )]
    pub async fn handle_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<Option<ResponseEnvelope>, SkillError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let outcome = match tokio::time::timeout(self.deadline, self.dispatch(event)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.metrics.inc_deadline_exceeded();
                Err(SkillError::DeadlineExceeded(self.deadline))
            }
        };

        self.metrics.observe_latency(started.elapsed());
        outcome
    }

    async fn dispatch(&self, event: &PlatformEvent) -> Result<Option<ResponseEnvelope>, SkillError> {
        if event.session.new {
            info!("session started");
        }

        let kind = event.request_kind().ok_or_else(|| {
            SkillError::UnrecognizedRequestType(event.request.request_type.clone())
        })?;
        let attributes = event.session.attributes.clone().unwrap_or_else(Map::new);

        match kind {
            RequestKind::Launch => {
                info!("launch");
                self.metrics.inc_launch();
                Ok(Some(ResponseEnvelope::new(attributes, welcome_speechlet())))
            }
            RequestKind::Intent => {
                let intent = event
                    .request
                    .intent
                    .as_ref()
                    .ok_or(SkillError::MissingIntent)?;
                let resolution = self.resolve_intent(intent).await?;
                Ok(Some(ResponseEnvelope::new(
                    attributes,
                    resolution.into_speechlet(),
                )))
            }
            RequestKind::SessionEnded => {
                info!(reason = ?event.request.reason, "session ended");
                Ok(None)
            }
        }
    }

    async fn resolve_intent(&self, intent: &IntentPayload) -> Result<Resolution, SkillError> {
        if intent.name != GET_TRAIN_STATUS_INTENT {
            return Err(SkillError::UnrecognizedIntent(intent.name.clone()));
        }

        info!(intent = %intent.name, "intent");
        let resolution = resolve_train_status(self.source.as_ref(), intent).await;
        match &resolution {
            Resolution::SlotUnrecognized { .. } => self.metrics.inc_unrecognized_slot(),
            Resolution::StatusFetched { .. } => self.metrics.inc_status_lookup(),
            Resolution::StatusUnavailable { .. } => {
                self.metrics.inc_status_lookup();
                self.metrics.inc_fetch_failure();
            }
        }

        Ok(resolution)
    }
}
