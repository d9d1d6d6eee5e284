use axum::{
    Form, Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::{Html, Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    models::{AnalyzeForm, InteractionOutcome},
    pages::{FormValues, Pages},
    workflow::InteractionWorkflow,
};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);
type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn page_error(message: &str) -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!(
            "<!DOCTYPE html><html><body><h1>Something went wrong</h1><p>{message}</p></body></html>"
        )),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub workflow: InteractionWorkflow,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(workflow: InteractionWorkflow) -> Result<Self, minijinja::Error> {
        Ok(Self {
            workflow,
            pages: Arc::new(Pages::new()?),
        })
    }
}

pub fn create_app(config: &AppConfig) -> anyhow::Result<Router> {
    let workflow = InteractionWorkflow::from_config(config);
    Ok(build_router(AppState::new(workflow)?))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/analyze", post(analyze_form))
        .route("/api", get(api_description))
        .route("/api/analyze", post(analyze_json))
        .route("/health", get(health_check))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tag every request with a correlation id and run it inside a span carrying it.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert(CORRELATION_ID_HEADER, value.clone());
        let mut response = next.run(request).instrument(span).await;
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        response
    } else {
        next.run(request).instrument(span).await
    }
}

async fn form_page(State(state): State<AppState>) -> PageResult {
    state
        .pages
        .form(state.workflow.has_configured_credential())
        .map(Html)
        .map_err(|e| {
            error!(error = %e, "failed to render form");
            page_error("Failed to render the form")
        })
}

async fn api_description() -> Json<Value> {
    Json(json!({
        "service": "Drug-Protein Interaction Analyzer",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "NCBI lookup, LLM interaction report and 3D structure viewer for a protein/drug pair",
        "endpoints": {
            "GET /": "HTML form",
            "POST /analyze": "Run the analysis from a submitted form",
            "POST /api/analyze": "Run the analysis from a JSON body",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn run_analysis(state: &AppState, form: &AnalyzeForm) -> Result<InteractionOutcome, String> {
    let request = form.to_request();
    info!(
        protein = %request.protein_name,
        drug = %request.drug_name,
        structure_id = ?request.structure_id,
        "Starting interaction analysis"
    );

    state
        .workflow
        .run(request, form.api_key.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "interaction workflow failed");
            e.to_string()
        })
}

async fn analyze_form(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> PageResult {
    let outcome = run_analysis(&state, &form)
        .await
        .map_err(|_| page_error("The analysis workflow failed"))?;

    state
        .pages
        .report(
            &FormValues::from(&form),
            &outcome,
            state.workflow.has_configured_credential(),
        )
        .map(Html)
        .map_err(|e| {
            error!(error = %e, "failed to render report");
            page_error("Failed to render the report")
        })
}

async fn analyze_json(
    State(state): State<AppState>,
    Json(form): Json<AnalyzeForm>,
) -> ApiResult<InteractionOutcome> {
    run_analysis(&state, &form)
        .await
        .map(Json)
        .map_err(|details| internal_error("Interaction workflow failed", &details))
}
