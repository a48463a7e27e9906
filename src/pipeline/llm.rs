//! Service interaction: build the request and send it over a [`Transport`].
//!
//! Request construction is provider-specific and pure, so it is tested
//! without a network. Sending goes through the object-safe [`Transport`]
//! trait: [`HttpTransport`] in production, a canned fake in tests.
//!
//! There is no retry loop. Exactly one request is sent per submission and
//! any failure is returned to the workflow, which reports it to the user.

use crate::config::{Provider, SimplifyConfig};
use crate::error::SimplifyError;
use crate::pipeline::encode::EncodedDocument;
use crate::pipeline::postprocess;
use crate::prompts::GUIDE_INSTRUCTION;
use futures::future::BoxFuture;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A fully-built outbound request.
#[derive(Clone)]
pub struct ServiceRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: serde_json::Value,
}

impl fmt::Debug for ServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values may hold the credential.
        let names: Vec<&str> = self.headers.iter().map(|(n, _)| *n).collect();
        f.debug_struct("ServiceRequest")
            .field("url", &self.url)
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

impl ServiceRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a [`ServiceRequest`] and returns the raw response.
///
/// Implementations return `Err` only when no response was obtained at all
/// (connection failure, timeout). Non-success statuses are returned as a
/// normal [`ServiceResponse`].
pub trait Transport: Send + Sync {
    fn send(&self, request: ServiceRequest)
        -> BoxFuture<'_, Result<ServiceResponse, SimplifyError>>;
}

/// The production transport: one `reqwest` client with a request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, SimplifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SimplifyError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: ServiceRequest,
    ) -> BoxFuture<'_, Result<ServiceResponse, SimplifyError>> {
        Box::pin(async move {
            let mut builder = self.client.post(&request.url).json(&request.body);
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    SimplifyError::Timeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    SimplifyError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    SimplifyError::Timeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    SimplifyError::RequestFailed {
                        reason: format!("Failed to read response body: {e}"),
                    }
                }
            })?;

            Ok(ServiceResponse { status, body })
        })
    }
}

/// Pick the configured transport, or build the HTTP one.
pub fn resolve_transport(config: &SimplifyConfig) -> Result<Arc<dyn Transport>, SimplifyError> {
    if let Some(ref transport) = config.transport {
        return Ok(Arc::clone(transport));
    }
    Ok(Arc::new(HttpTransport::new(config.api_timeout_secs)?))
}

/// Build the single request for a document.
///
/// An empty credential sends no auth header; whether that is acceptable was
/// decided earlier by [`crate::pipeline::input::validate_submission`].
pub fn build_request(
    config: &SimplifyConfig,
    doc: &EncodedDocument,
    credential: &str,
) -> ServiceRequest {
    let base = config
        .endpoint
        .as_deref()
        .unwrap_or_else(|| config.provider.default_endpoint())
        .trim_end_matches('/');
    let model = config.effective_model();
    let instruction = config.instruction.as_deref().unwrap_or(GUIDE_INSTRUCTION);
    let credential = credential.trim();

    match config.provider {
        Provider::Anthropic => {
            let mut headers = vec![("anthropic-version", ANTHROPIC_VERSION.to_string())];
            if !credential.is_empty() {
                headers.push(("x-api-key", credential.to_string()));
            }
            ServiceRequest {
                url: format!("{base}/v1/messages"),
                headers,
                body: json!({
                    "model": model,
                    "max_tokens": config.max_tokens,
                    "temperature": config.temperature,
                    "messages": [{
                        "role": "user",
                        "content": [
                            {
                                "type": "document",
                                "source": {
                                    "type": "base64",
                                    "media_type": doc.media_type,
                                    "data": doc.data,
                                }
                            },
                            { "type": "text", "text": instruction }
                        ]
                    }]
                }),
            }
        }
        Provider::Gemini => {
            let mut headers = Vec::new();
            if !credential.is_empty() {
                headers.push(("x-goog-api-key", credential.to_string()));
            }
            ServiceRequest {
                url: format!("{base}/v1beta/models/{model}:generateContent"),
                headers,
                body: json!({
                    "contents": [{
                        "role": "user",
                        "parts": [
                            {
                                "inline_data": {
                                    "mime_type": doc.media_type,
                                    "data": doc.data,
                                }
                            },
                            { "text": instruction }
                        ]
                    }],
                    "generationConfig": {
                        "temperature": config.temperature,
                        "maxOutputTokens": config.max_tokens,
                        "responseMimeType": "application/json",
                    }
                }),
            }
        }
    }
}

/// Send the document and return the response's text part.
///
/// Non-success statuses become [`SimplifyError::ServiceError`]; a success
/// with no text part becomes [`SimplifyError::MissingText`].
pub async fn request_guide_text(
    transport: &Arc<dyn Transport>,
    config: &SimplifyConfig,
    doc: &EncodedDocument,
    credential: &str,
) -> Result<String, SimplifyError> {
    let start = Instant::now();
    let request = build_request(config, doc, credential);
    info!(
        "Sending '{}' to {} ({})",
        doc.file_name,
        config.provider,
        config.effective_model()
    );
    debug!("Request: {:?}", request);

    let response = transport.send(request).await.inspect_err(|e| {
        warn!("Request for '{}' failed: {}", doc.file_name, e);
    })?;
    debug!(
        "HTTP {} with {} bytes after {:?}",
        response.status,
        response.body.len(),
        start.elapsed()
    );

    if !response.is_success() {
        let err = SimplifyError::from_status(response.status, &response.body);
        warn!("Service returned HTTP {}: {}", response.status, err);
        return Err(err);
    }

    postprocess::extract_text(config.provider, &response.body)
}
