//! HTTP surface for the OCR pipeline.
//!
//! A thin axum layer: the request extractor reduces a request to one
//! [`InputSource`](crate::pipeline::input::InputSource) plus an optional
//! language, the handlers call [`OcrService`], and [`ApiError`] is the single
//! place where an [`OcrError`] becomes a status code and the
//! `{success: false, error}` envelope.

mod extract;
mod handlers;
mod routes;

pub use extract::OcrRequest;
pub use routes::create_router;

use crate::convert::OcrService;
use crate::error::OcrError;
use crate::response;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OcrService>,
}

impl AppState {
    pub fn new(service: OcrService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Start the web server and block until it exits.
pub async fn serve(service: OcrService, host: &str, port: u16) -> Result<(), OcrError> {
    let app = create_router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| OcrError::InvalidConfig(format!("listen address {host}:{port}: {e}")))?;
    info!("Starting OCR server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| OcrError::Internal(format!("bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| OcrError::Internal(format!("server: {e}")))?;

    Ok(())
}

/// An [`OcrError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub OcrError);

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", self.0.kind(), self.0);
        } else {
            warn!("Rejected request ({}): {}", self.0.kind(), self.0);
        }
        (status, Json(response::assemble_error(&self.0))).into_response()
    }
}
