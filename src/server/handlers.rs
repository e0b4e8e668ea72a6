//! Endpoint handlers.

use super::{ApiError, AppState, OcrRequest};
use crate::response::{self, LanguagesResponse, MarkdownResponse, OcrResponse};
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

/// Service descriptor.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "edgequake-ocr",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/ocr": "POST - Extract raw text from an image or PDF",
            "/ocr-markdown": "POST - Extract structured Markdown from an image or PDF",
            "/health": "GET - Service health",
            "/languages": "GET - Supported recognition languages"
        }
    }))
}

/// Health check endpoint for container orchestration.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "engine": state.service.registry().engine_name(),
        "loaded_languages": state.service.registry().languages(),
    }))
}

pub async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(response::assemble_languages(state.service.config()))
}

/// `POST /ocr`: raw transcript with per-line details.
pub async fn ocr(
    State(state): State<AppState>,
    request: OcrRequest,
) -> Result<Json<OcrResponse>, ApiError> {
    let resp = state
        .service
        .extract_text(request.source, request.lang.as_deref())
        .await?;
    Ok(Json(resp))
}

/// `POST /ocr-markdown`: transcript plus heading-structured Markdown.
pub async fn ocr_markdown(
    State(state): State<AppState>,
    request: OcrRequest,
) -> Result<Json<MarkdownResponse>, ApiError> {
    let resp = state
        .service
        .extract_markdown(request.source, request.lang.as_deref())
        .await?;
    Ok(Json(resp))
}
