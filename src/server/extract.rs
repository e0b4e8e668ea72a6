//! Request extraction: multipart or JSON body → one input channel + language.

use super::ApiError;
use crate::error::OcrError;
use crate::pipeline::input::InputSource;
use axum::extract::{FromRequest, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

/// A request reduced to its single input channel.
#[derive(Debug)]
pub struct OcrRequest {
    pub source: InputSource,
    /// Form field, then query string, then JSON field.
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonPayload {
    image: Option<String>,
    url: Option<String>,
    lang: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for OcrRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query_lang = Query::<LangQuery>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(q)| q.lang);

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            let form = read_form(multipart).await?;
            debug!("Multipart request: upload={}", form.upload.is_some());
            let source = InputSource::from_channels(form.upload, form.image_text, form.url)?;
            return Ok(Self {
                source,
                lang: first_present([form.lang, query_lang]),
            });
        }

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<JsonPayload>::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            let source = InputSource::from_channels(None, payload.image, payload.url)?;
            return Ok(Self {
                source,
                lang: first_present([query_lang, payload.lang]),
            });
        }

        Err(ApiError(OcrError::MissingInput))
    }
}

#[derive(Default)]
struct FormFields {
    upload: Option<InputSource>,
    image_text: Option<String>,
    url: Option<String>,
    lang: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<FormFields, ApiError> {
    let mut form = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_body(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" if field.file_name().is_some() => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| bad_body(e.body_text()))?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    form.upload = Some(InputSource::Upload {
                        bytes: bytes.to_vec(),
                        filename,
                        content_type,
                    });
                }
            }
            "image" => {
                form.image_text = Some(field.text().await.map_err(|e| bad_body(e.body_text()))?)
            }
            "url" => form.url = Some(field.text().await.map_err(|e| bad_body(e.body_text()))?),
            "lang" => form.lang = Some(field.text().await.map_err(|e| bad_body(e.body_text()))?),
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(form)
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|l| !l.trim().is_empty())
}

fn bad_body(reason: String) -> ApiError {
    ApiError(OcrError::InvalidInput {
        input: "request body".to_string(),
        reason,
    })
}
