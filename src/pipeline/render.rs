//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! pdfium wraps a C++ library with thread-local state that is not safe to
//! call from async contexts, so all work here runs inside
//! `tokio::task::spawn_blocking`. Uploads arrive in memory, so documents are
//! opened straight from the byte slice rather than a temp file.
//!
//! Pages beyond the configured cap are dropped, not an error; the truncation
//! is logged and visible to callers through the returned page count.

use crate::error::AnalysisError;
use bytes::Bytes;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// Rasterise up to `max_pages` pages of a PDF, longest edge capped at
/// `max_dim` pixels. Returns the rendered pages in page order.
///
/// # Errors
/// * [`AnalysisError::DocumentCorrupt`] when the bytes cannot be opened as a
///   PDF (including encrypted documents: no password channel exists).
/// * [`AnalysisError::EmptyDocument`] for a zero-page document.
/// * [`AnalysisError::Internal`] when the pdfium library is missing or the
///   render task panics.
pub async fn render_pdf_pages(
    bytes: Bytes,
    max_pages: usize,
    max_dim: u32,
) -> Result<Vec<DynamicImage>, AnalysisError> {
    tokio::task::spawn_blocking(move || render_blocking(&bytes, max_pages, max_dim))
        .await
        .map_err(|e| AnalysisError::Internal(format!("render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_blocking(
    bytes: &[u8],
    max_pages: usize,
    max_dim: u32,
) -> Result<Vec<DynamicImage>, AnalysisError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("not a readable PDF: {e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!(total_pages, "PDF loaded");

    if total_pages == 0 {
        return Err(AnalysisError::EmptyDocument {
            detail: "PDF has no pages".into(),
        });
    }

    let rendered_count = total_pages.min(max_pages);
    if rendered_count < total_pages {
        warn!(
            total_pages,
            max_pages, "PDF exceeds page cap, dropping excess pages"
        );
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_dim as i32)
        .set_maximum_height(max_dim as i32);

    let mut results = Vec::with_capacity(rendered_count);

    for idx in 0..rendered_count {
        let page = pages
            .get(idx as u16)
            .map_err(|e| AnalysisError::DocumentCorrupt {
                detail: format!("failed to open page {}: {e:?}", idx + 1),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| AnalysisError::DocumentCorrupt {
                    detail: format!("rasterisation failed for page {}: {e:?}", idx + 1),
                })?;

        let image = bitmap.as_image();
        debug!(
            page = idx + 1,
            width = image.width(),
            height = image.height(),
            "rendered page"
        );

        results.push(image);
    }

    Ok(results)
}

/// Bind to the pdfium shared library: a copy next to the executable wins,
/// otherwise the system-installed library is used.
fn bind_pdfium() -> Result<Pdfium, AnalysisError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| {
            AnalysisError::Internal(format!(
                "failed to bind pdfium library (install pdfium or place it next to the binary): {e}"
            ))
        })?;
    Ok(Pdfium::new(bindings))
}

// Rendering requires the pdfium shared library at runtime; behavioural tests
// live in tests/service.rs behind the E2E_ENABLED gate.
