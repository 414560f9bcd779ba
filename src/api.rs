use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::analyzer::AggregateResult;
use crate::error::ApiError;
use crate::spreadsheet;
use crate::AppState;

pub const MISSING_REVIEW_TEXT: &str = "'reviewText' field is missing";
pub const NO_VALID_INPUT: &str = "No valid input provided. Send raw text or upload a file.";

/// Documented shape of the JSON body. The handler reads `reviewText` out of a
/// raw `Value` so non-string reviews still reach the analyzer.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(rename = "reviewText")]
    pub review_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Review text mapped to its scores or to `{"error": ...}`.
    #[serde(rename = "sentimentAnalysisResults")]
    #[schema(value_type = Object)]
    pub results: AggregateResult,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

/// Analyze raw review text or an uploaded CSV/XLSX file of reviews.
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "sentiment",
    request_body(
        content = AnalyzeRequest,
        description = "Raw review as JSON, or multipart/form-data with a `file` part (.csv or .xlsx)",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Scores keyed by review text", body = AnalyzeResponse),
        (status = 400, description = "Missing or unsupported input", body = crate::error::ErrorBody),
        (status = 413, description = "Upload over the configured size limit", body = crate::error::ErrorBody),
        (status = 500, description = "Unexpected failure", body = crate::error::ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(mime_essence)
        .unwrap_or_default();

    let results = if is_json(&content_type) {
        let review = read_review_text(request, &state).await?;
        info!("📥 [API] Analyzing raw review text");
        state.analyzer.analyze_all([&review]).await
    } else if content_type == "multipart/form-data" {
        let upload = read_upload(request, &state)
            .await?
            .ok_or_else(|| ApiError::bad_request(NO_VALID_INPUT))?;
        let reviews = spreadsheet::read_reviews(&upload.filename, &upload.bytes)?;
        info!("📥 [API] Analyzing {} reviews from {}", reviews.len(), upload.filename);
        state.analyzer.analyze_all(&reviews).await
    } else {
        return Err(ApiError::bad_request(NO_VALID_INPUT));
    };

    Ok(Json(AnalyzeResponse { results }))
}

async fn read_review_text(request: Request, state: &Arc<AppState>) -> Result<Value, ApiError> {
    let Json(body) = Json::<Value>::from_request(request, state)
        .await
        .map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large(e.body_text())
            } else {
                ApiError::bad_request(format!("Failed to decode JSON object: {}", e.body_text()))
            }
        })?;

    body.as_object()
        .and_then(|object| object.get("reviewText"))
        .cloned()
        .ok_or_else(|| ApiError::bad_request(MISSING_REVIEW_TEXT))
}

/// First file part named `file`. Parts without a filename are form fields,
/// not uploads, and are skipped.
async fn read_upload(request: Request, state: &Arc<AppState>) -> Result<Option<Upload>, ApiError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(Upload { filename, bytes }));
    }

    Ok(None)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(e.body_text())
    } else {
        ApiError::internal(e.body_text())
    }
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(mime: &str) -> bool {
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
