use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use subway_core::PlatformEvent;
use subway_observability::{MetricsSnapshot, SkillMetrics};
use subway_skill::{SkillConfig, SkillError, TrainStatusSkill};
use subway_status::HttpStatusClient;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

const MAX_EVENT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub skill: SkillConfig,
    /// When set, events from any other application are refused before dispatch.
    pub application_id: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let skill = SkillConfig::from_env().context("invalid skill configuration")?;
        let application_id = env::var("SUBWAY_APPLICATION_ID")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            skill,
            application_id,
        })
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub skill: Arc<TrainStatusSkill<HttpStatusClient>>,
    pub metrics: Arc<SkillMetrics>,
    pub application_id: Option<Arc<str>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    identity_check: bool,
    metrics: MetricsSnapshot,
}

pub fn build_app(config: ApiConfig) -> Result<Router> {
    let metrics = SkillMetrics::shared();
    let skill = TrainStatusSkill::from_config(config.skill, metrics.clone())
        .context("failed to build status client")?;

    let state = ApiState {
        skill: Arc::new(skill),
        metrics,
        application_id: config.application_id.map(Arc::from),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/skill", post(skill_event))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_EVENT_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        identity_check: state.application_id.is_some(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn skill_event(State(state): State<ApiState>, Json(event): Json<PlatformEvent>) -> Response {
    if let Some(expected) = state.application_id.as_deref() {
        if event.application_id() != Some(expected) {
            warn!(
                application_id = ?event.application_id(),
                request_id = %event.request.request_id,
                "rejected event from unknown application"
            );
            return error_response(
                StatusCode::FORBIDDEN,
                "invalid_application_id",
                "Invalid Application ID",
            );
        }
    }

    match state.skill.handle_event(&event).await {
        Ok(Some(envelope)) => (StatusCode::OK, Json(envelope)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => skill_error_response(&error),
    }
}

fn skill_error_response(error: &SkillError) -> Response {
    warn!(error = %error, "skill invocation failed");
    let (status, code) = match error {
        SkillError::UnrecognizedIntent(_) => (StatusCode::BAD_REQUEST, "unrecognized_intent"),
        SkillError::UnrecognizedRequestType(_) => {
            (StatusCode::BAD_REQUEST, "unrecognized_request_type")
        }
        SkillError::MissingIntent => (StatusCode::BAD_REQUEST, "missing_intent"),
        SkillError::DeadlineExceeded(_) => (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded"),
    };
    error_response(status, code, &error.to_string())
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}
