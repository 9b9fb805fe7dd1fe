//! # doculens
//!
//! Analyze uploaded images and documents with a vision language model.
//!
//! An uploaded file (image, PDF, or Word document) is normalized into a
//! bounded sequence of model-ready content blocks, sent to a vision-capable
//! model together with a task-specific instruction, and the model's text
//! reply is returned with lightweight metadata. PDFs are rasterised
//! page-by-page so the model reads them as a human would; DOCX text is
//! extracted and sent as plain text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate   extension allow-list + size ceiling
//!  ├─ 2. Normalize  image passthrough / PDF rasterisation / DOCX text
//!  ├─ 3. Build      ordered content parts + per-mode instruction
//!  ├─ 4. Call       one bounded-timeout request to the vision model
//!  └─ 5. Shape      verbatim model text + filename / page count / usage
//! ```
//!
//! Each request takes exactly this path, once. There are no retries, no
//! partial results, and no state shared between requests beyond the
//! immutable [`AppConfig`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use doculens::{AnalysisRequest, Analyzer, AppConfig, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?; // reads ANTHROPIC_API_KEY
//!     let analyzer = Analyzer::new(config)?;
//!
//!     let bytes = Bytes::from(std::fs::read("invoice.pdf")?);
//!     let file = UploadedFile::new("invoice.pdf", bytes);
//!     let result = analyzer
//!         .analyze(&file, &AnalysisRequest::extract_text())
//!         .await?;
//!     println!("{}", result.result);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the axum HTTP surface and the `doculens` binary |
//!
//! Disable `server` when embedding only the pipeline:
//! ```toml
//! doculens = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "server")]
pub mod api;
pub mod analyze;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{AnalysisRequest, Analyzer, UploadedFile};
pub use client::{ProviderReply, VisionClient};
pub use config::{AppConfig, AppConfigBuilder};
pub use error::AnalysisError;
pub use output::{AnalysisResult, ErrorBody};
pub use pipeline::normalize::{ContentBlock, NormalizedDocument, SourceKind};
pub use prompts::{AnalysisMode, ResponseLanguage};
