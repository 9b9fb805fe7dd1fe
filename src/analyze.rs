//! The analysis pipeline entry point.
//!
//! One request takes exactly one path:
//!
//! ```text
//! Validate ──▶ Normalize ──▶ Build ──▶ Call ──▶ Shape
//! ```
//!
//! The pipeline is stateless; the first stage that rejects the input
//! terminates the request with its typed error, and no stage ever retries a
//! previous one. The only shared object is the immutable [`AppConfig`]
//! captured by the [`Analyzer`] at construction.

use crate::client::VisionClient;
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::output::AnalysisResult;
use crate::pipeline::{normalize, request, validate};
use crate::prompts::{AnalysisMode, ResponseLanguage};
use bytes::Bytes;
use std::time::Instant;
use tracing::{debug, info};

/// An upload as received from the HTTP boundary. Lives for the duration of
/// one request; nothing is persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as declared by the client.
    pub filename: String,
    /// Raw file content.
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercase extension of the declared filename, if any.
    pub fn extension(&self) -> Option<String> {
        validate::extension_of(&self.filename)
    }
}

/// What the caller asked for: the task, an optional question, and the
/// response language.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    /// Required iff `mode` is [`AnalysisMode::CustomQuery`].
    pub query: Option<String>,
    pub language: ResponseLanguage,
}

impl AnalysisRequest {
    pub fn full_analysis(language: ResponseLanguage) -> Self {
        Self {
            mode: AnalysisMode::FullAnalysis,
            query: None,
            language,
        }
    }

    pub fn extract_text() -> Self {
        Self {
            mode: AnalysisMode::ExtractText,
            query: None,
            language: ResponseLanguage::default(),
        }
    }

    pub fn describe(language: ResponseLanguage) -> Self {
        Self {
            mode: AnalysisMode::Describe,
            query: None,
            language,
        }
    }

    pub fn custom_query(query: impl Into<String>, language: ResponseLanguage) -> Self {
        Self {
            mode: AnalysisMode::CustomQuery,
            query: Some(query.into()),
            language,
        }
    }
}

/// The assembled pipeline: configuration plus the provider client.
///
/// Construct once at startup and share behind an `Arc`; every request runs
/// through [`Analyzer::analyze`] independently.
#[derive(Debug)]
pub struct Analyzer {
    config: AppConfig,
    client: VisionClient,
}

impl Analyzer {
    pub fn new(config: AppConfig) -> Result<Self, AnalysisError> {
        let client = VisionClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run one upload through the full pipeline.
    pub async fn analyze(
        &self,
        file: &UploadedFile,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        info!(
            filename = %file.filename,
            size = file.bytes.len(),
            mode = request.mode.as_str(),
            "starting analysis"
        );

        // ── Stage 1: validate ────────────────────────────────────────────
        validate::validate(
            &file.filename,
            file.bytes.len(),
            self.config.max_upload_bytes,
        )?;

        // ── Stage 2: normalize ───────────────────────────────────────────
        let doc = normalize::normalize(file, &self.config).await?;
        debug!(
            kind = ?doc.kind,
            blocks = doc.page_count(),
            "normalization complete"
        );

        // ── Stage 3: build request ───────────────────────────────────────
        let content = request::build_content(
            &doc,
            &file.filename,
            request.mode,
            request.query.as_deref(),
            request.language,
        )?;

        // ── Stage 4: call the provider ───────────────────────────────────
        let reply = self.client.complete(content).await?;

        // ── Stage 5: shape the result ────────────────────────────────────
        let result = AnalysisResult::shape(request.mode, &file.filename, &doc, reply);

        info!(
            filename = %file.filename,
            pages = result.page_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        // Provider deliberately unreachable; these tests never get that far.
        let config = AppConfig::builder()
            .api_key("test-key")
            .api_base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        Analyzer::new(config).unwrap()
    }

    #[tokio::test]
    async fn rejected_extension_stops_before_normalization() {
        let analyzer = analyzer();
        let file = UploadedFile::new("photo.exe", Bytes::from_static(b"MZ\x90\x00"));
        let err = analyzer
            .analyze(&file, &AnalysisRequest::extract_text())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnsupportedFileType { extension } if extension == "exe"
        ));
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let config = AppConfig::builder()
            .api_key("test-key")
            .max_upload_bytes(16)
            .build()
            .unwrap();
        let analyzer = Analyzer::new(config).unwrap();
        let file = UploadedFile::new("big.png", Bytes::from(vec![0u8; 17]));
        let err = analyzer
            .analyze(&file, &AnalysisRequest::extract_text())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::FileTooLarge { size: 17, max: 16 }));
    }

    #[tokio::test]
    async fn missing_query_surfaces_before_provider_call() {
        let analyzer = analyzer();
        let bytes = crate::pipeline::docx::docx_with_paragraphs(&["hello"]);
        let file = UploadedFile::new("note.docx", Bytes::from(bytes));
        let request = AnalysisRequest {
            mode: AnalysisMode::CustomQuery,
            query: None,
            language: ResponseLanguage::Swedish,
        };
        let err = analyzer.analyze(&file, &request).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingQuery));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let analyzer = analyzer();
        let bytes = crate::pipeline::docx::docx_with_paragraphs(&["hello"]);
        let file = UploadedFile::new("note.docx", Bytes::from(bytes));
        let err = analyzer
            .analyze(&file, &AnalysisRequest::extract_text())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AnalysisError::ProviderUnavailable { .. }),
            "got: {err:?}"
        );
    }
}
