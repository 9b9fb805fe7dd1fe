//! Format normalization: a validated upload → ordered content blocks.
//!
//! This is the only stage with real branching. Dispatch happens on the
//! (already validated) file extension:
//!
//! * raster image → exactly one [`ContentBlock::Image`], re-encoded only
//!   when the provider cannot take the original;
//! * PDF → one image block per rasterised page, in page order, up to the
//!   configured page cap (excess pages are dropped by policy, not an error);
//! * DOCX → one [`ContentBlock::Text`] with the concatenated paragraph text.
//!
//! CPU-bound work (decode, re-encode, rasterise) runs on the blocking pool.

use crate::analyze::UploadedFile;
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::pipeline::{docx, encode, render};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One unit of model input: an image payload or a text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    /// Base64-encoded image with its MIME type.
    Image { media_type: String, data: String },
    /// Plain extracted text.
    Text { text: String },
}

/// What kind of source the normalizer detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Image,
    PdfPages,
    DocText,
}

/// The normalizer's output: a detected source kind plus the ordered block
/// sequence representing one logical document.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub kind: SourceKind,
    pub blocks: Vec<ContentBlock>,
}

impl NormalizedDocument {
    /// Number of blocks; for PDFs this is the number of pages actually sent.
    pub fn page_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of image blocks (used for the page-labelling prompt hint).
    pub fn image_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::Image { .. }))
            .count()
    }
}

enum FileCategory {
    Raster,
    Pdf,
    WordDoc,
}

fn category_of(extension: &str) -> Option<FileCategory> {
    match extension {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tiff" => Some(FileCategory::Raster),
        "pdf" => Some(FileCategory::Pdf),
        "docx" | "doc" => Some(FileCategory::WordDoc),
        _ => None,
    }
}

/// Convert a validated upload into an ordered sequence of content blocks.
pub async fn normalize(
    file: &UploadedFile,
    config: &AppConfig,
) -> Result<NormalizedDocument, AnalysisError> {
    if file.bytes.is_empty() {
        return Err(AnalysisError::EmptyDocument {
            detail: "file is empty (0 bytes)".into(),
        });
    }

    let extension = file.extension().unwrap_or_default();
    let Some(category) = category_of(&extension) else {
        // The validator runs first, so this only triggers when normalize is
        // called directly with an unvalidated name.
        return Err(AnalysisError::UnsupportedFileType { extension });
    };

    match category {
        FileCategory::Raster => {
            let bytes = file.bytes.clone();
            let max_dim = config.max_image_dim;
            let block = tokio::task::spawn_blocking(move || {
                encode::image_block_from_upload(&bytes, &extension, max_dim)
            })
            .await
            .map_err(|e| AnalysisError::Internal(format!("image task panicked: {e}")))??;

            debug!(filename = %file.filename, "normalized raster image");
            Ok(NormalizedDocument {
                kind: SourceKind::Image,
                blocks: vec![block],
            })
        }
        FileCategory::Pdf => {
            let pages = render::render_pdf_pages(
                file.bytes.clone(),
                config.max_pdf_pages,
                config.max_image_dim,
            )
            .await?;

            let mut blocks = Vec::with_capacity(pages.len());
            for page in &pages {
                blocks.push(encode::image_block_from_page(page)?);
            }

            debug!(filename = %file.filename, pages = blocks.len(), "normalized PDF");
            Ok(NormalizedDocument {
                kind: SourceKind::PdfPages,
                blocks,
            })
        }
        FileCategory::WordDoc => {
            let bytes = file.bytes.clone();
            let text = tokio::task::spawn_blocking(move || docx::extract_text(&bytes))
                .await
                .map_err(|e| AnalysisError::Internal(format!("docx task panicked: {e}")))??;

            if text.is_empty() {
                return Err(AnalysisError::EmptyDocument {
                    detail: "document contains no text".into(),
                });
            }

            debug!(filename = %file.filename, chars = text.len(), "normalized word document");
            Ok(NormalizedDocument {
                kind: SourceKind::DocText,
                blocks: vec![ContentBlock::Text { text }],
            })
        }
    }
}
