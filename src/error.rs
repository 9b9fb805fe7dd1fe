//! Error types for the doculens analysis pipeline.
//!
//! Every failure a request can hit is one of the variants of
//! [`AnalysisError`]. All variants are terminal for the request: the pipeline
//! never retries an earlier stage, and no partial result is ever returned.
//!
//! Variants fall into three groups:
//!
//! * **Input errors** (`UnsupportedFileType`, `FileTooLarge`, `EmptyDocument`,
//!   `DocumentCorrupt`, `MissingQuery`): the caller sent something the
//!   pipeline cannot work with. Surfaced as 4xx responses.
//! * **Provider errors** (`ProviderUnavailable`, `ProviderRejected`): the
//!   one outbound vision-model call failed. `ProviderUnavailable` covers
//!   transport problems (connect, timeout); `ProviderRejected` covers any
//!   non-success HTTP status, carrying the provider's message where the body
//!   parses. Surfaced as 503 / 502 respectively.
//! * **Faults** (`InvalidConfig`, `Internal`): a bug or environment problem
//!   (missing pdfium library, panicked blocking task), never caused by the
//!   uploaded content.

use thiserror::Error;

/// All errors returned by the doculens pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The file extension is not on the allow-list.
    #[error("Unsupported file type '{extension}' (allowed: png, jpg, jpeg, gif, webp, bmp, tiff, pdf, docx, doc)")]
    UnsupportedFileType { extension: String },

    /// The upload exceeds the configured size ceiling.
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    /// The file has no analyzable content (zero bytes, zero PDF pages,
    /// or a word document with no text).
    #[error("Empty document: {detail}")]
    EmptyDocument { detail: String },

    /// The file matched an accepted extension but its content could not be
    /// read in that format.
    #[error("Document could not be read: {detail}")]
    DocumentCorrupt { detail: String },

    /// `customQuery` mode was selected without a non-empty question.
    #[error("Custom query mode requires a non-empty 'query' field")]
    MissingQuery,

    // ── Provider errors ───────────────────────────────────────────────────
    /// The vision-model endpoint could not be reached (network or timeout).
    #[error("Vision provider unreachable: {detail}")]
    ProviderUnavailable { detail: String },

    /// The vision-model endpoint answered with a non-success status
    /// (invalid key, rate limit, payload too large, ...).
    #[error("Vision provider rejected the request (HTTP {status}): {message}")]
    ProviderRejected { status: u16, message: String },

    // ── Faults ────────────────────────────────────────────────────────────
    /// Configuration failed validation at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (never caused by the uploaded content).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Stable machine-readable name of the error kind, as it appears in the
    /// JSON error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::UnsupportedFileType { .. } => "UnsupportedFileType",
            AnalysisError::FileTooLarge { .. } => "FileTooLarge",
            AnalysisError::EmptyDocument { .. } => "EmptyDocument",
            AnalysisError::DocumentCorrupt { .. } => "DocumentCorrupt",
            AnalysisError::MissingQuery => "MissingQuery",
            AnalysisError::ProviderUnavailable { .. } => "ProviderUnavailable",
            AnalysisError::ProviderRejected { .. } => "ProviderRejected",
            AnalysisError::InvalidConfig(_) => "InvalidConfig",
            AnalysisError::Internal(_) => "Internal",
        }
    }

    /// True for errors caused by the uploaded content or request shape,
    /// false for provider errors and faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnsupportedFileType { .. }
                | AnalysisError::FileTooLarge { .. }
                | AnalysisError::EmptyDocument { .. }
                | AnalysisError::DocumentCorrupt { .. }
                | AnalysisError::MissingQuery
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_display() {
        let e = AnalysisError::FileTooLarge {
            size: 30_000_000,
            max: 20_971_520,
        };
        let msg = e.to_string();
        assert!(msg.contains("30000000"), "got: {msg}");
        assert!(msg.contains("20971520"), "got: {msg}");
    }

    #[test]
    fn unsupported_file_type_display() {
        let e = AnalysisError::UnsupportedFileType {
            extension: "exe".into(),
        };
        assert!(e.to_string().contains("'exe'"));
    }

    #[test]
    fn provider_rejected_display() {
        let e = AnalysisError::ProviderRejected {
            status: 401,
            message: "invalid x-api-key".into(),
        };
        assert!(e.to_string().contains("401"));
        assert!(e.to_string().contains("invalid x-api-key"));
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AnalysisError::MissingQuery.kind(), "MissingQuery");
        assert_eq!(
            AnalysisError::EmptyDocument {
                detail: "x".into()
            }
            .kind(),
            "EmptyDocument"
        );
        assert_eq!(
            AnalysisError::ProviderUnavailable {
                detail: "x".into()
            }
            .kind(),
            "ProviderUnavailable"
        );
    }

    #[test]
    fn client_error_split() {
        assert!(AnalysisError::MissingQuery.is_client_error());
        assert!(AnalysisError::UnsupportedFileType {
            extension: "exe".into()
        }
        .is_client_error());
        assert!(!AnalysisError::ProviderRejected {
            status: 429,
            message: "rate limited".into()
        }
        .is_client_error());
        assert!(!AnalysisError::Internal("boom".into()).is_client_error());
    }
}
