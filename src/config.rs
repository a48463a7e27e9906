//! Configuration for the upload workflow.
//!
//! All behaviour is controlled through [`SimplifyConfig`], built via its
//! [`SimplifyConfigBuilder`]. The credential is deliberately *not* part of
//! the configuration: it is session state owned by
//! [`crate::workflow::UploadWorkflow`] and never serialised.

use crate::error::SimplifyError;
use crate::pipeline::llm::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for guide generation.
///
/// # Example
/// ```rust
/// use manual_simplifier::{Provider, SimplifyConfig};
///
/// let config = SimplifyConfig::builder()
///     .provider(Provider::Gemini)
///     .model("gemini-2.0-flash")
///     .api_timeout_secs(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SimplifyConfig {
    /// Which document-understanding service to call. Default: Anthropic.
    pub provider: Provider,

    /// Model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// Base URL override, e.g. a local proxy. If None, uses the provider's
    /// public endpoint.
    pub endpoint: Option<String>,

    /// Maximum tokens the service may generate. Default: 4096.
    ///
    /// A guide with a dozen steps is well under 2 000 tokens; the headroom
    /// covers verbose manuals without truncating the JSON mid-object.
    pub max_tokens: usize,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Whether a non-empty credential must be supplied. Default: true.
    ///
    /// Disable only when `endpoint` points at a proxy that injects its own key.
    pub require_credential: bool,

    /// Request timeout in seconds. Default: 120.
    ///
    /// A 40-page manual routinely takes 30–60 s to process.
    pub api_timeout_secs: u64,

    /// Cadence of the cosmetic progress indicator in milliseconds. Default: 900.
    pub progress_interval_ms: u64,

    /// Custom instruction. If None, uses [`crate::prompts::GUIDE_INSTRUCTION`].
    pub instruction: Option<String>,

    /// Pre-constructed transport. Takes precedence over the built-in HTTP client.
    pub transport: Option<Arc<dyn Transport>>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            endpoint: None,
            max_tokens: 4096,
            temperature: 0.2,
            require_credential: true,
            api_timeout_secs: 120,
            progress_interval_ms: 900,
            instruction: None,
            transport: None,
        }
    }
}

impl fmt::Debug for SimplifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplifyConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("require_credential", &self.require_credential)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("progress_interval_ms", &self.progress_interval_ms)
            .field("transport", &self.transport.as_ref().map(|_| "<dyn Transport>"))
            .finish()
    }
}

impl SimplifyConfig {
    /// Create a new builder for `SimplifyConfig`.
    pub fn builder() -> SimplifyConfigBuilder {
        SimplifyConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will actually be requested.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Builder for [`SimplifyConfig`].
#[derive(Debug)]
pub struct SimplifyConfigBuilder {
    config: SimplifyConfig,
}

impl SimplifyConfigBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.config.provider = provider;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn require_credential(mut self, v: bool) -> Self {
        self.config.require_credential = v;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_interval_ms(mut self, ms: u64) -> Self {
        self.config.progress_interval_ms = ms;
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SimplifyConfig, SimplifyError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(SimplifyError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(SimplifyError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.progress_interval_ms == 0 {
            return Err(SimplifyError::InvalidConfig(
                "Progress interval must be ≥ 1 ms".into(),
            ));
        }
        if let Some(ref url) = c.endpoint {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SimplifyError::InvalidConfig(format!(
                    "Endpoint must be an HTTP/HTTPS URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The external document-understanding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    /// Anthropic Messages API with a base64 `document` content block. (default)
    #[default]
    Anthropic,
    /// Google Gemini `generateContent` with an `inline_data` PDF part.
    Gemini,
}

impl Provider {
    /// Short lowercase name used in logs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::Gemini => "gemini-2.0-flash",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Provider {
    type Err = SimplifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(SimplifyError::InvalidConfig(format!(
                "Unsupported provider '{other}'. Supported: anthropic, gemini"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SimplifyConfig::default();
        assert_eq!(c.provider, Provider::Anthropic);
        assert_eq!(c.progress_interval_ms, 900);
        assert!(c.require_credential);
        assert_eq!(c.effective_model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn model_override_wins() {
        let c = SimplifyConfig::builder()
            .provider(Provider::Gemini)
            .model("gemini-2.5-pro")
            .build()
            .unwrap();
        assert_eq!(c.effective_model(), "gemini-2.5-pro");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = SimplifyConfig::builder().api_timeout_secs(0).build();
        assert!(matches!(err, Err(SimplifyError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = SimplifyConfig::builder().endpoint("ftp://proxy").build();
        assert!(err.is_err());
    }

    #[test]
    fn provider_from_str() {
        assert_eq!("Claude".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("openai".parse::<Provider>().is_err());
    }
}
