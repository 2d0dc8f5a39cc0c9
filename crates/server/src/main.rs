use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use generation::GeminiClient;
use server_api::{credential::EnvCredential, run_workflow, WorkflowContext};
use shared::protocol::{healthz_route, workflow_route, ErrorBody, GestureEvent, WorkflowResult};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use crate::config::{load_settings, Settings};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let state = build_state(&settings)?;
    let static_dir = settings.static_dir();
    match &static_dir {
        Some(dir) => info!(dir = %dir.display(), "serving static ui assets"),
        None => warn!(dir = %settings.static_dir, "static ui directory not found; serving api only"),
    }
    let app = build_router(Arc::new(state), static_dir.as_deref());

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid server_bind '{}'", settings.server_bind))?;
    info!(%addr, model = %settings.model, "workflow server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let backend = GeminiClient::new(&settings.api_base_url, settings.request_timeout())
        .context("failed to build generation client")?;
    let credentials = EnvCredential::new(&settings.api_key_env, settings.api_key.clone());
    let workflow = WorkflowContext::new(
        Arc::new(backend),
        Arc::new(credentials),
        settings.system_instruction()?,
    )
    .with_sampling(settings.sampling());
    Ok(AppState { workflow })
}

fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route(healthz_route(), get(healthz))
        .route(workflow_route(), post(http_workflow))
        .with_state(state);
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };
    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_workflow(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GestureEvent>, JsonRejection>,
) -> Result<Json<WorkflowResult>, (StatusCode, Json<ErrorBody>)> {
    let Json(event) =
        payload.map_err(|e| (e.status(), Json(ErrorBody::new(e.body_text()))))?;
    let result = run_workflow(&state.workflow, &event)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::from(e))))?;
    Ok(Json(result))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
