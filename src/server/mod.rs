//! HTTP dashboard and JSON API.
//!
//! Routes:
//! - `GET /` - home page
//! - `GET /analysis?sample=<name>` - analysis form, optionally prefilled
//! - `POST /analysis` - analyze the submitted `claim_text` form field
//! - `POST /api/analyze` - JSON `{claim_text}` in, `AnalysisReport` out
//! - `GET /api/samples` - the sample claim library
//! - `GET /health` - liveness and workspace status

mod pages;

pub use pages::{analysis_page, escape_html, home_page, AnalysisOutcome};

use crate::analysis::Services;
use crate::config::Settings;
use crate::error::ClaimscopeError;
use crate::samples::{find_sample, SAMPLE_CLAIMS};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state.
pub struct AppState {
    pub services: Services,
    pub settings: Settings,
}

impl AppState {
    pub fn new(services: Services, settings: Settings) -> Arc<Self> {
        Arc::new(Self { services, settings })
    }
}

/// Build the router with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/analysis", get(analysis_form).post(analysis_submit))
        .route("/api/analyze", post(api_analyze))
        .route("/api/samples", get(api_samples))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
pub struct SampleQuery {
    #[serde(default)]
    sample: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    claim_text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// HTTP status for a failed analysis.
fn status_for(err: &ClaimscopeError) -> StatusCode {
    match err {
        ClaimscopeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.services.status();
    Json(serde_json::json!({
        "status": "ok",
        "workspace": status,
        "environment": state.settings.general.environment,
    }))
}

async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(home_page(state.services.status(), &state.settings))
}

async fn analysis_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SampleQuery>,
) -> Html<String> {
    let selected = query.sample.as_deref().and_then(find_sample);
    let claim_text = selected.map(|s| s.text).unwrap_or_default();

    Html(analysis_page(
        state.services.status(),
        &state.settings,
        claim_text,
        selected,
        AnalysisOutcome::None,
    ))
}

async fn analysis_submit(
    State(state): State<Arc<AppState>>,
    Form(req): Form<AnalyzeRequest>,
) -> Html<String> {
    let status = state.services.status();
    let result = match state.services.analyzer() {
        Ok(analyzer) => analyzer.analyze(&req.claim_text).await,
        Err(e) => Err(e),
    };

    let page = match &result {
        Ok(report) => analysis_page(
            status,
            &state.settings,
            &req.claim_text,
            None,
            AnalysisOutcome::Report(report),
        ),
        Err(e) => {
            error!("Analysis failed: {}", e);
            let message = e.to_string();
            analysis_page(
                status,
                &state.settings,
                &req.claim_text,
                None,
                AnalysisOutcome::Error(&message),
            )
        }
    };

    Html(page)
}

async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    let analyzer = match state.services.analyzer() {
        Ok(analyzer) => analyzer,
        Err(e) => return error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    };

    match analyzer.analyze(&req.claim_text).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!("Analysis failed: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

async fn api_samples() -> impl IntoResponse {
    Json(SAMPLE_CLAIMS.to_vec())
}
