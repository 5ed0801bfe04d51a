//! Axum app: state, router, handlers and the request-logging middleware.
//!
//! Routes:
//! - `GET /` serves the embedded UI page
//! - `GET /health` reports configuration status without calling upstream
//! - `POST /improve` (JSON) and `POST /improve_prompt` (form) run one improvement
//! - `POST /clarify` (JSON) asks for clarifying questions

use crate::core::service::PromptImprover;
use crate::domain::model::{ClarifyOutcome, ClarifyRequest, ImprovementRequest, ImprovementResult, QaPair};
use crate::domain::ports::CompletionClient;
use crate::utils::error::{DepromptError, ErrorCategory, Result, UnavailableKind};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Request, State,
    },
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub type SharedImprover = PromptImprover<Arc<dyn CompletionClient>>;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub improver: Arc<SharedImprover>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(improver: SharedImprover) -> Self {
        Self {
            improver: Arc::new(improver),
            started_at: Utc::now(),
        }
    }
}

/// Body of `POST /improve` and `POST /improve_prompt`.
#[derive(Debug, Default, Deserialize)]
pub struct ImproveBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub target_model: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl ImproveBody {
    fn into_request(self) -> ImprovementRequest {
        ImprovementRequest::new(self.prompt, self.target_model.as_deref())
            .with_context(self.context.filter(|c| !c.trim().is_empty()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClarifyBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub target_model: Option<String>,
    #[serde(default)]
    pub answers: Vec<QaPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ErrorResponse {
    pub fn from_error(error: &DepromptError) -> Self {
        Self {
            error_kind: error.kind().to_string(),
            message: error.user_friendly_message(),
            retry_after_seconds: error.retry_after().map(|wait| wait.as_secs()),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    api_key_configured: bool,
    model: String,
    timeout_seconds: u64,
    started_at: DateTime<Utc>,
}

pub fn status_for(error: &DepromptError) -> StatusCode {
    match error {
        DepromptError::Validation { .. } => StatusCode::BAD_REQUEST,
        DepromptError::Configuration { .. } | DepromptError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DepromptError::UpstreamUnavailable {
            kind: UnavailableKind::Timeout,
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        DepromptError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DepromptError::UpstreamRejected { .. } | DepromptError::UpstreamFormat { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

// 解析失敗的請求本文也回傳 `{ error_kind, message }`
impl From<JsonRejection> for DepromptError {
    fn from(rejection: JsonRejection) -> Self {
        DepromptError::validation(rejection.body_text())
    }
}

impl From<FormRejection> for DepromptError {
    fn from(rejection: FormRejection) -> Self {
        DepromptError::validation(rejection.body_text())
    }
}

impl IntoResponse for DepromptError {
    fn into_response(self) -> Response {
        match self.category() {
            ErrorCategory::Input => tracing::info!("Rejected request: {}", self),
            _ => tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            ),
        }

        let status = status_for(&self);
        let body = ErrorResponse::from_error(&self);
        let mut response = (status, Json(body)).into_response();

        if let Some(wait) = self.retry_after() {
            if let Ok(value) = HeaderValue::from_str(&wait.as_secs().to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/improve", post(improve_json))
        .route("/improve_prompt", post(improve_form))
        .route("/clarify", post(clarify))
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

/// Serves the router on an existing listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("🚀 deprompt listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.improver.config();
    Json(HealthResponse {
        status: "ok",
        api_key_configured: config.api_key_configured(),
        model: config.model.clone(),
        timeout_seconds: config.timeout.as_secs(),
        started_at: state.started_at,
    })
}

async fn improve_json(
    State(state): State<AppState>,
    body: std::result::Result<Json<ImproveBody>, JsonRejection>,
) -> Result<Json<ImprovementResult>> {
    let Json(body) = body?;
    run_improve(&state, body).await
}

async fn improve_form(
    State(state): State<AppState>,
    body: std::result::Result<Form<ImproveBody>, FormRejection>,
) -> Result<Json<ImprovementResult>> {
    let Form(body) = body?;
    run_improve(&state, body).await
}

async fn run_improve(state: &AppState, body: ImproveBody) -> Result<Json<ImprovementResult>> {
    let request = body.into_request();
    let result = state.improver.improve(&request).await?;
    Ok(Json(result))
}

async fn clarify(
    State(state): State<AppState>,
    body: std::result::Result<Json<ClarifyBody>, JsonRejection>,
) -> Result<Json<ClarifyOutcome>> {
    let Json(body) = body?;
    let request =
        ClarifyRequest::new(body.prompt, body.target_model.as_deref()).with_answers(body.answers);
    let outcome = state.improver.clarify(&request).await?;
    Ok(Json(outcome))
}

/// Tags each request with an id (echoed from `x-request-id` or generated) and logs timing.
///
/// Handler logs run inside a `request` span carrying the id.
async fn request_logging(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
