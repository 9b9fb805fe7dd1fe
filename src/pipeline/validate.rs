//! Upload validation: extension allow-list and size ceiling.
//!
//! This is a pure check on (filename, byte length). There is deliberately no
//! content sniffing here: a file whose bytes do not match its extension
//! surfaces as a normalization failure downstream, not a validation failure.

use crate::error::AnalysisError;
use std::path::Path;

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 10] = [
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "pdf", "docx", "doc",
];

/// Extract the lowercase extension from a filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Validate an upload before any content is touched.
///
/// Checks run in order: extension against [`ALLOWED_EXTENSIONS`], then byte
/// length against `max_bytes`. A `photo.exe` is rejected as
/// [`AnalysisError::UnsupportedFileType`] no matter its size.
pub fn validate(filename: &str, size: usize, max_bytes: usize) -> Result<(), AnalysisError> {
    let extension = extension_of(filename).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AnalysisError::UnsupportedFileType { extension });
    }

    if size > max_bytes {
        return Err(AnalysisError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1024;

    #[test]
    fn all_allowed_extensions_pass() {
        for ext in ALLOWED_EXTENSIONS {
            let name = format!("upload.{ext}");
            assert!(validate(&name, 100, MAX).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(validate("SCAN.PDF", 100, MAX).is_ok());
        assert!(validate("photo.JPeG", 100, MAX).is_ok());
    }

    #[test]
    fn executable_is_rejected() {
        let err = validate("photo.exe", 100, MAX).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnsupportedFileType { extension } if extension == "exe"
        ));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = validate("README", 100, MAX).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFileType { .. }));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let err = validate("scan.pdf", MAX + 1, MAX).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::FileTooLarge { size, max } if size == MAX + 1 && max == MAX
        ));
    }

    #[test]
    fn unsupported_type_beats_size_check() {
        // An oversized .exe must still report the type error first.
        let err = validate("huge.exe", MAX * 10, MAX).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFileType { .. }));
    }

    #[test]
    fn size_at_limit_passes() {
        assert!(validate("scan.pdf", MAX, MAX).is_ok());
    }
}
