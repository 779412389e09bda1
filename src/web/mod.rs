// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for the claim validator
//!
//! Serves the single page (upload panel + result panel) as server-rendered
//! HTML, and the same operations as a JSON API under `/api`.

mod render;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::analyzer::{analyze_documents, ClaimAnalyzer};
use crate::config::AppConfig;
use crate::intake::{ClaimFile, ClaimFileSummary};
use crate::session::{Session, SessionSnapshot};
use crate::verdict::VerdictReport;
use crate::{ClaimError, Result};

pub use render::escape_html;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Arc<dyn ClaimAnalyzer>,
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(config: AppConfig, analyzer: Arc<dyn ClaimAnalyzer>) -> Self {
        Self {
            config,
            analyzer,
            session: Mutex::new(Session::new()),
        }
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| ClaimError::Config("Session lock poisoned".to_string()))
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.intake.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/files", post(upload_files))
        .route("/files/remove", post(remove_file))
        .route("/analyze", post(start_analysis))
        .route("/reset", post(reset_session))
        // API endpoints
        .route("/api/files", get(api_get_files).post(api_upload_files).delete(api_remove_file))
        .route("/api/analyze", post(api_analyze))
        .route("/api/state", get(api_get_state))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// === Error Responses ===

/// Error body for the JSON API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Claim error rendered as an HTTP response
#[derive(Debug)]
pub struct WebError(pub ClaimError);

impl From<ClaimError> for WebError {
    fn from(err: ClaimError) -> Self {
        WebError(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ClaimError::NoDocuments => (StatusCode::BAD_REQUEST, "no_documents"),
            e if e.is_user_correctable() => (StatusCode::BAD_REQUEST, "bad_upload"),
            ClaimError::AnalysisInProgress => (StatusCode::CONFLICT, "analysis_in_progress"),
            ClaimError::SafetyBlocked(_) => (StatusCode::BAD_GATEWAY, "safety_blocked"),
            ClaimError::EmptyResponse | ClaimError::MalformedResponse(_) => {
                (StatusCode::BAD_GATEWAY, "malformed_response")
            }
            ClaimError::Api(_) | ClaimError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "service_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error: code.to_string(),
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

// === Shared Operations ===

/// Read every file part of a multipart upload. All or nothing.
async fn read_uploads(config: &AppConfig, mut multipart: Multipart) -> Result<Vec<ClaimFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClaimError::Intake(format!("Failed to read upload: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        // Browsers send an empty part when the picker was opened and cancelled
        if name.is_empty() {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ClaimError::Intake(format!("Failed to read {}: {}", name, e)))?;

        files.push(ClaimFile::from_bytes(&name, declared.as_deref(), &bytes, &config.intake)?);
    }

    Ok(files)
}

/// Analyze on a detached task that records the outcome in the session.
///
/// The task outlives the request that started it.
fn spawn_analysis(state: Arc<AppState>, files: Vec<ClaimFile>) -> JoinHandle<Result<VerdictReport>> {
    tokio::spawn(async move {
        let result = analyze_documents(state.analyzer.as_ref(), &files).await;
        match state.lock_session() {
            Ok(mut session) => session.finish_analysis(&result),
            Err(e) => error!("Could not record analysis result: {}", e),
        }
        result
    })
}

/// Run one analysis to completion against the session
async fn run_analysis(state: Arc<AppState>) -> Result<VerdictReport> {
    let files = state.lock_session()?.begin_analysis()?;
    spawn_analysis(state, files)
        .await
        .map_err(|e| ClaimError::Config(format!("Analysis task failed: {}", e)))?
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Response {
    match state.lock_session() {
        Ok(session) => Html(render::render_index(session.files(), session.state())).into_response(),
        Err(e) => WebError(e).into_response(),
    }
}

async fn upload_files(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let uploaded = read_uploads(&state.config, multipart).await;

    match state.lock_session() {
        Ok(mut session) => match uploaded {
            Ok(files) => {
                info!("Added {} file(s) to session", files.len());
                session.add_files(files);
            }
            Err(e) => {
                warn!("Upload rejected: {}", e);
                session.record_error(e.user_message());
            }
        },
        Err(e) => return WebError(e).into_response(),
    }

    Redirect::to("/").into_response()
}

#[derive(Deserialize)]
struct RemoveForm {
    name: String,
}

async fn remove_file(State(state): State<Arc<AppState>>, Form(form): Form<RemoveForm>) -> Response {
    match state.lock_session() {
        Ok(mut session) => {
            let removed = session.remove_file(&form.name);
            info!("Removed {} file(s) named {}", removed, form.name);
            Redirect::to("/").into_response()
        }
        Err(e) => WebError(e).into_response(),
    }
}

async fn start_analysis(State(state): State<Arc<AppState>>) -> Response {
    let files = match state.lock_session() {
        Ok(mut session) => session.begin_analysis(),
        Err(e) => return WebError(e).into_response(),
    };

    match files {
        Ok(files) => {
            spawn_analysis(Arc::clone(&state), files);
        }
        // Already reflected in the session state
        Err(e) => warn!("Analysis not started: {}", e),
    }

    Redirect::to("/").into_response()
}

async fn reset_session(State(state): State<Arc<AppState>>) -> Response {
    let cleared = match state.lock_session() {
        Ok(mut session) => session.clear(),
        Err(e) => Err(e),
    };

    match cleared {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            warn!("Reset refused: {}", e);
            WebError(e).into_response()
        }
    }
}

// === API Handlers ===

async fn api_get_files(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<Vec<ClaimFileSummary>>, WebError> {
    let session = state.lock_session()?;
    Ok(Json(session.files().iter().map(ClaimFile::summary).collect()))
}

async fn api_upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> std::result::Result<Json<Vec<ClaimFileSummary>>, WebError> {
    let files = read_uploads(&state.config, multipart).await?;
    let mut session = state.lock_session()?;
    session.add_files(files);
    Ok(Json(session.files().iter().map(ClaimFile::summary).collect()))
}

#[derive(Deserialize)]
struct RemoveQuery {
    name: String,
}

#[derive(Serialize)]
struct RemoveResponse {
    removed: usize,
}

async fn api_remove_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RemoveQuery>,
) -> std::result::Result<Json<RemoveResponse>, WebError> {
    let removed = state.lock_session()?.remove_file(&query.name);
    Ok(Json(RemoveResponse { removed }))
}

async fn api_analyze(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<VerdictReport>, WebError> {
    Ok(Json(run_analysis(state).await?))
}

async fn api_get_state(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<SessionSnapshot>, WebError> {
    Ok(Json(state.lock_session()?.snapshot()))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    analyzer: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        analyzer: state.analyzer.name().to_string(),
    })
}

/// Start the web server with config and analyzer
pub async fn start_server(config: AppConfig, analyzer: Arc<dyn ClaimAnalyzer>) -> Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, analyzer));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ClaimError::Config(format!("Server error: {}", e)))?;

    info!("Web UI stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
