//! Source resolution: normalise any accepted input channel into a [`Document`].
//!
//! Three channels are accepted — raw upload bytes, a base64 payload, or an
//! HTTP(S) URL — and exactly one must be present. Whatever the channel, the
//! bytes go through the same format sniffing: the `%PDF` magic wins over any
//! declared content type or filename, then the declared metadata is
//! consulted, and everything else is treated as a raster image.

use crate::config::ServiceConfig;
use crate::error::OcrError;
use crate::output::Document;
use crate::pipeline::render::{self, RenderOptions};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::time::Duration;
use tracing::{debug, info};

const PDF_MAGIC: &[u8] = b"%PDF";

/// One request's input, already reduced to a single channel.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Multipart file upload.
    Upload {
        bytes: Vec<u8>,
        filename: Option<String>,
        content_type: Option<String>,
    },
    /// Base64 payload, optionally carrying a `data:...;base64,` header.
    Base64(String),
    /// Remote document to fetch.
    Url(String),
}

impl InputSource {
    /// Pick the single channel present in a request.
    ///
    /// Blank strings count as absent. Fails with `MissingInput` when no
    /// channel is present and `InvalidInput` when more than one is.
    pub fn from_channels(
        upload: Option<InputSource>,
        base64: Option<String>,
        url: Option<String>,
    ) -> Result<Self, OcrError> {
        let base64 = base64.filter(|s| !s.trim().is_empty());
        let url = url.filter(|s| !s.trim().is_empty());

        let mut present: Vec<InputSource> = Vec::with_capacity(1);
        present.extend(upload);
        present.extend(base64.map(InputSource::Base64));
        present.extend(url.map(InputSource::Url));

        match present.len() {
            0 => Err(OcrError::MissingInput),
            1 => Ok(present.remove(0)),
            n => Err(OcrError::InvalidInput {
                input: present
                    .iter()
                    .map(InputSource::channel)
                    .collect::<Vec<_>>()
                    .join("+"),
                reason: format!("{n} input channels supplied; send exactly one"),
            }),
        }
    }

    /// Channel name: `upload`, `base64`, or `url`.
    pub fn channel(&self) -> &'static str {
        match self {
            InputSource::Upload { .. } => "upload",
            InputSource::Base64(_) => "base64",
            InputSource::Url(_) => "url",
        }
    }

    /// Human-readable origin: the filename, the URL, or the channel name.
    pub fn label(&self) -> String {
        match self {
            InputSource::Upload {
                filename: Some(name),
                ..
            } if !name.is_empty() => name.clone(),
            InputSource::Url(url) => url.clone(),
            other => other.channel().to_string(),
        }
    }
}

/// Container format of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Image,
}

/// Decide whether `bytes` is a PDF or a raster image.
///
/// Content first (the `%PDF` signature), then the declared content type,
/// then the filename suffix.
pub fn sniff_format(
    bytes: &[u8],
    content_type: Option<&str>,
    filename: Option<&str>,
) -> SourceFormat {
    if bytes.starts_with(PDF_MAGIC) {
        return SourceFormat::Pdf;
    }
    let declared_pdf = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/pdf"))
        .unwrap_or(false);
    let named_pdf = filename
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    if declared_pdf || named_pdf {
        SourceFormat::Pdf
    } else {
        SourceFormat::Image
    }
}

/// Strip a leading `data:<mime>;base64,` header, if any.
pub fn strip_data_uri(payload: &str) -> &str {
    let trimmed = payload.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, data)) = trimmed.split_once(',') {
            return data;
        }
    }
    trimmed
}

/// Decode a base64 payload after stripping any data-URI header.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, OcrError> {
    let data: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(data.as_bytes())
        .map_err(|e| OcrError::decode(format!("malformed base64: {e}")))
}

/// Parse `input` and accept it only with an `http` or `https` scheme.
pub fn validate_url(input: &str) -> Result<reqwest::Url, OcrError> {
    let url = reqwest::Url::parse(input.trim()).map_err(|e| OcrError::InvalidInput {
        input: input.to_string(),
        reason: format!("not a valid URL: {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OcrError::InvalidInput {
            input: input.to_string(),
            reason: format!("unsupported URL scheme '{other}', expected http or https"),
        }),
    }
}

/// Body and metadata of a fetched URL.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl FetchedPayload {
    pub fn format(&self) -> SourceFormat {
        sniff_format(
            &self.bytes,
            self.content_type.as_deref(),
            self.filename.as_deref(),
        )
    }
}

/// Resolves [`InputSource`]s into [`Document`]s.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    client: reqwest::Client,
    timeout_secs: u64,
    render: RenderOptions,
}

impl SourceResolver {
    pub fn new(config: &ServiceConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| OcrError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.download_timeout_secs,
            render: RenderOptions {
                dpi: config.dpi,
                max_rendered_pixels: config.max_rendered_pixels,
                pdfium_lib_path: config.pdfium_lib_path.clone(),
            },
        })
    }

    /// Turn one input channel into a document of RGB pages.
    pub async fn resolve(&self, source: InputSource) -> Result<Document, OcrError> {
        info!("Resolving input from {} channel", source.channel());
        match source {
            InputSource::Upload {
                bytes,
                filename,
                content_type,
            } => {
                self.materialise(bytes, content_type.as_deref(), filename.as_deref())
                    .await
            }
            InputSource::Base64(payload) => {
                let bytes = decode_base64(&payload)?;
                self.materialise(bytes, None, None).await
            }
            InputSource::Url(url) => {
                let fetched = self.fetch(&url).await?;
                self.materialise(
                    fetched.bytes,
                    fetched.content_type.as_deref(),
                    fetched.filename.as_deref(),
                )
                .await
            }
        }
    }

    /// Download `url`, failing on non-2xx status or timeout.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPayload, OcrError> {
        let parsed = validate_url(url)?;
        info!("Downloading document from: {}", parsed);

        let to_fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                OcrError::FetchTimeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                OcrError::FetchError {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(to_fetch_error)?;

        if !response.status().is_success() {
            return Err(OcrError::FetchError {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = extract_filename(&parsed);

        let bytes = response.bytes().await.map_err(to_fetch_error)?;
        debug!(
            "Downloaded {} bytes (content-type: {:?})",
            bytes.len(),
            content_type
        );

        Ok(FetchedPayload {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        })
    }

    async fn materialise(
        &self,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Document, OcrError> {
        if bytes.is_empty() {
            return Err(OcrError::decode("input is empty"));
        }
        match sniff_format(&bytes, content_type, filename) {
            SourceFormat::Pdf => {
                debug!("Detected PDF payload ({} bytes)", bytes.len());
                let pages = render::rasterise_pdf(bytes, &self.render).await?;
                Document::new(pages, true)
            }
            SourceFormat::Image => {
                debug!("Detected raster image payload ({} bytes)", bytes.len());
                let page = render::decode_image(&bytes)?;
                Ok(Document::single(page))
            }
        }
    }
}

/// Last path segment of the URL, when it looks like a filename.
fn extract_filename(url: &reqwest::Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(str::to_string)
}
