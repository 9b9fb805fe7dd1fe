//! Image encoding: uploaded bytes or rendered PDF pages → base64 payloads.
//!
//! The provider accepts base64 images embedded in the JSON request body, in
//! PNG, JPEG, GIF, or WebP. Uploads already in one of those formats pass
//! through untouched as long as they fit the dimension and payload ceilings;
//! everything else (BMP, TIFF, oversized images) is decoded and re-encoded.
//!
//! PNG is the re-encode default because it is lossless and text crispness
//! matters for OCR accuracy. JPEG (quality 85) is used for JPEG sources and
//! as a fallback when a PNG payload would exceed the per-image ceiling.

use crate::error::AnalysisError;
use crate::pipeline::normalize::ContentBlock;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Provider ceiling for a single image payload, before base64 expansion.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const JPEG_QUALITY: u8 = 85;

/// Encode an uploaded raster image as exactly one image block.
///
/// `extension` is the validated lowercase file extension; `max_dim` caps the
/// longest edge. Returns [`AnalysisError::DocumentCorrupt`] when the bytes
/// cannot be decoded in any supported format.
pub fn image_block_from_upload(
    bytes: &[u8],
    extension: &str,
    max_dim: u32,
) -> Result<ContentBlock, AnalysisError> {
    // Formats the provider accepts as-is; BMP and TIFF always re-encode.
    let passthrough_type = match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    };

    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("unreadable image data: {e}"),
        })?
        .into_dimensions()
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("not a decodable image: {e}"),
        })?;

    if let Some(media_type) = passthrough_type {
        if width <= max_dim && height <= max_dim && bytes.len() <= MAX_IMAGE_BYTES {
            debug!(media_type, width, height, "image passed through unchanged");
            return Ok(ContentBlock::Image {
                media_type: media_type.to_string(),
                data: STANDARD.encode(bytes),
            });
        }
    }

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("unreadable image data: {e}"),
        })?
        .decode()
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("image decode failed: {e}"),
        })?;

    let img = if width > max_dim || height > max_dim {
        debug!(width, height, max_dim, "downscaling oversized image");
        img.resize(max_dim, max_dim, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG sources stay JPEG after a resize; anything else becomes PNG.
    if matches!(extension, "jpg" | "jpeg") {
        encode_jpeg(&img)
    } else {
        encode_png_with_fallback(&img)
    }
}

/// Encode a rasterised PDF page as an image block.
pub fn image_block_from_page(img: &DynamicImage) -> Result<ContentBlock, AnalysisError> {
    encode_png_with_fallback(img)
}

/// PNG-encode, falling back to JPEG when the payload would exceed the
/// provider's per-image ceiling (dense scans at high resolution).
fn encode_png_with_fallback(img: &DynamicImage) -> Result<ContentBlock, AnalysisError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| AnalysisError::Internal(format!("PNG encoding failed: {e}")))?;

    if buf.len() > MAX_IMAGE_BYTES {
        debug!(png_bytes = buf.len(), "PNG exceeds payload ceiling, re-encoding as JPEG");
        return encode_jpeg(img);
    }

    debug!(encoded_bytes = buf.len(), "encoded image as PNG");
    Ok(ContentBlock::Image {
        media_type: "image/png".to_string(),
        data: STANDARD.encode(&buf),
    })
}

fn encode_jpeg(img: &DynamicImage) -> Result<ContentBlock, AnalysisError> {
    // JPEG has no alpha channel; flatten first.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AnalysisError::Internal(format!("JPEG encoding failed: {e}")))?;

    debug!(encoded_bytes = buf.len(), "encoded image as JPEG");
    Ok(ContentBlock::Image {
        media_type: "image/jpeg".to_string(),
        data: STANDARD.encode(&buf),
    })
}
