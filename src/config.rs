//! Service configuration.
//!
//! Every knob lives in one immutable [`AppConfig`], built via its
//! [`AppConfigBuilder`] or loaded from the environment with
//! [`AppConfig::from_env`]. The struct is constructed once at startup and
//! passed explicitly into the [`crate::analyze::Analyzer`]; nothing in the
//! pipeline reads ambient global state after that point.

use crate::error::AnalysisError;
use serde::Serialize;
use std::fmt;

/// Default upload ceiling: 20 MB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Configuration for the analysis service.
///
/// # Example
/// ```rust
/// use doculens::AppConfig;
///
/// let config = AppConfig::builder()
///     .api_key("sk-ant-...")
///     .max_pdf_pages(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pdf_pages, 10);
/// ```
#[derive(Clone, Serialize)]
pub struct AppConfig {
    /// API key for the vision-model provider.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Vision model identifier. Default: `claude-sonnet-4-5-20250929`.
    pub model: String,

    /// Base URL of the provider API. Default: `https://api.anthropic.com`.
    ///
    /// Overridable so tests and gateway deployments can point the single
    /// outbound call somewhere else without touching the pipeline.
    pub api_base_url: String,

    /// Maximum accepted upload size in bytes. Default: 20 MB.
    pub max_upload_bytes: usize,

    /// Maximum number of PDF pages rasterized per document. Default: 20.
    ///
    /// Pages beyond the cap are dropped, not an error; the response's
    /// `pageCount` reflects the pages actually sent.
    pub max_pdf_pages: usize,

    /// Longest edge of any image sent to the provider, in pixels.
    /// Default: 1568.
    ///
    /// Larger uploads are downscaled and PDF pages are rendered at this
    /// bound. 1568 px is the provider's resolution sweet spot; above it the
    /// image is tiled down anyway and the extra bytes only cost upload time.
    pub max_image_dim: u32,

    /// Maximum tokens the model may generate per request. Default: 4096.
    pub max_tokens: usize,

    /// Total timeout for the provider call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Connect timeout for the provider call in seconds. Default: 10.
    pub connect_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            api_base_url: "https://api.anthropic.com".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_pdf_pages: 20,
            max_image_dim: 1568,
            max_tokens: 4096,
            api_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_pdf_pages", &self.max_pdf_pages)
            .field("max_image_dim", &self.max_image_dim)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Create a new builder for `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Field | Default |
    /// |----------|-------|---------|
    /// | `ANTHROPIC_API_KEY` | `api_key` | required |
    /// | `DOCULENS_MODEL` | `model` | `claude-sonnet-4-5-20250929` |
    /// | `DOCULENS_API_BASE_URL` | `api_base_url` | `https://api.anthropic.com` |
    /// | `DOCULENS_MAX_UPLOAD_MB` | `max_upload_bytes` | 20 |
    /// | `DOCULENS_MAX_PDF_PAGES` | `max_pdf_pages` | 20 |
    /// | `DOCULENS_MAX_IMAGE_DIM` | `max_image_dim` | 1568 |
    /// | `DOCULENS_MAX_TOKENS` | `max_tokens` | 4096 |
    /// | `DOCULENS_API_TIMEOUT_SECS` | `api_timeout_secs` | 120 |
    /// | `DOCULENS_CONNECT_TIMEOUT_SECS` | `connect_timeout_secs` | 10 |
    pub fn from_env() -> Result<Self, AnalysisError> {
        let mut builder = Self::builder();

        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "ANTHROPIC_API_KEY is not set".into(),
            ));
        }
        builder = builder.api_key(api_key);

        if let Ok(model) = std::env::var("DOCULENS_MODEL") {
            builder = builder.model(model);
        }
        if let Ok(url) = std::env::var("DOCULENS_API_BASE_URL") {
            builder = builder.api_base_url(url);
        }
        if let Some(mb) = env_number::<usize>("DOCULENS_MAX_UPLOAD_MB")? {
            builder = builder.max_upload_bytes(mb * 1024 * 1024);
        }
        if let Some(pages) = env_number::<usize>("DOCULENS_MAX_PDF_PAGES")? {
            builder = builder.max_pdf_pages(pages);
        }
        if let Some(dim) = env_number::<u32>("DOCULENS_MAX_IMAGE_DIM")? {
            builder = builder.max_image_dim(dim);
        }
        if let Some(tokens) = env_number::<usize>("DOCULENS_MAX_TOKENS")? {
            builder = builder.max_tokens(tokens);
        }
        if let Some(secs) = env_number::<u64>("DOCULENS_API_TIMEOUT_SECS")? {
            builder = builder.api_timeout_secs(secs);
        }
        if let Some(secs) = env_number::<u64>("DOCULENS_CONNECT_TIMEOUT_SECS")? {
            builder = builder.connect_timeout_secs(secs);
        }

        builder.build()
    }
}

/// Parse an optional numeric environment variable.
fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AnalysisError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AnalysisError::InvalidConfig(format!("{name} must be a number, got '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn max_pdf_pages(mut self, pages: usize) -> Self {
        self.config.max_pdf_pages = pages;
        self
    }

    pub fn max_image_dim(mut self, px: u32) -> Self {
        self.config.max_image_dim = px.max(100);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AppConfig, AnalysisError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.max_pdf_pages == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_pdf_pages must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.max_pdf_pages, 20);
        assert_eq!(config.max_image_dim, 1568);
        assert_eq!(config.api_base_url, "https://api.anthropic.com");
    }

    #[test]
    fn builder_clamps_image_dim() {
        let config = AppConfig::builder().max_image_dim(10).build().unwrap();
        assert_eq!(config.max_image_dim, 100);
    }

    #[test]
    fn builder_rejects_zero_pages() {
        let result = AppConfig::builder().max_pdf_pages(0).build();
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let config = AppConfig::builder()
            .api_base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig::builder().api_key("sk-ant-secret").build().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
