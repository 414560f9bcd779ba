//! Review sentiment service.
//!
//! `POST /analyze` takes a raw review (JSON) or a CSV/XLSX upload, scores each
//! review through a hosted chat-completion model and returns positive,
//! negative and neutral scores normalized to a total of 10.

pub mod analyzer;
pub mod api;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod inference;
pub mod normalizer;
pub mod recovery;
pub mod spreadsheet;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::analyzer::SentimentAnalyzer;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze),
    components(schemas(api::AnalyzeRequest, api::AnalyzeResponse, error::ErrorBody)),
    tags((name = "sentiment", description = "Review Sentiment API"))
)]
pub struct ApiDoc;

/// State shared by every request. The analyzer holds the process-wide
/// completion client.
pub struct AppState {
    pub analyzer: SentimentAnalyzer,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: SentimentAnalyzer, max_upload_bytes: usize) -> Self {
        Self {
            analyzer,
            max_upload_bytes,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(SwaggerUi::new("/sentiment-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/analyze", post(api::analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
