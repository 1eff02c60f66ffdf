//! HTTP surface: the landing page and the JSON analysis endpoint.
//!
//! - `GET /` - landing page with a text box
//! - `POST /analyze` - `{"text": ...}` in, annotated html, legend and sentiment out
//! - `GET /health` - liveness probe

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

use std::sync::Arc;

use log::*;

use crate::analysis::Analyzer;
use crate::Error;

const INDEX_HTML: &str = include_str!("../templates/index.html");

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

pub fn build_router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(analyzer)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Inference holds model locks and burns CPU, so it runs off the async workers.
async fn analyze(
    State(analyzer): State<Arc<Analyzer>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Response, Error> {
    let id = Uuid::new_v4();
    debug!("{}: analysing {} chars", id, request.text.len());
    let response = tokio::task::spawn_blocking(move || analyzer.analyze(&request.text)).await??;
    debug!(
        "{}: {} labels, sentiment {}",
        id,
        response.legend.len(),
        response.sentiment_label
    );
    Ok(Json(response).into_response())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Analysis failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub async fn serve(analyzer: Arc<Analyzer>, bind: &str) -> crate::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("Unable to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Stopping");
}
