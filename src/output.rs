//! Response shaping: the final result record returned to the caller.

use crate::client::ProviderReply;
use crate::pipeline::normalize::{NormalizedDocument, SourceKind};
use crate::prompts::AnalysisMode;
use serde::{Deserialize, Serialize};

/// Machine-readable error body, mirrored in failure responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// The shaped analysis result, returned directly as the response body.
///
/// Constructed once by [`AnalysisResult::shape`] and immutable afterwards.
/// `result` holds the provider's text verbatim; for multi-page PDFs any
/// per-page breakdown lives inside that text (the model is asked to label
/// pages itself; no structural split is attempted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub mode: AnalysisMode,
    /// Original upload filename, preserved unchanged.
    pub filename: String,
    /// Number of content blocks sent to the provider. For PDFs this is the
    /// number of pages actually rasterised (after the page cap).
    pub page_count: usize,
    pub source: SourceKind,
    /// The model's text output, verbatim.
    pub result: String,
    /// Model that produced the response, as reported by the provider.
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Always `null` on success; failures use the same field shape in a
    /// dedicated error body.
    pub error: Option<ErrorBody>,
}

impl AnalysisResult {
    /// Assemble the result record from the pipeline's outputs.
    pub fn shape(
        mode: AnalysisMode,
        filename: &str,
        doc: &NormalizedDocument,
        reply: ProviderReply,
    ) -> Self {
        Self {
            mode,
            filename: filename.to_string(),
            page_count: doc.page_count(),
            source: doc.kind,
            result: reply.text,
            model: reply.model,
            input_tokens: reply.input_tokens,
            output_tokens: reply.output_tokens,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::ContentBlock;

    fn reply(text: &str) -> ProviderReply {
        ProviderReply {
            text: text.to_string(),
            model: "claude-sonnet-4-5-20250929".into(),
            input_tokens: 100,
            output_tokens: 20,
        }
    }

    fn two_page_doc() -> NormalizedDocument {
        NormalizedDocument {
            kind: SourceKind::PdfPages,
            blocks: vec![
                ContentBlock::Image {
                    media_type: "image/png".into(),
                    data: "QQ==".into(),
                },
                ContentBlock::Image {
                    media_type: "image/png".into(),
                    data: "Qg==".into(),
                },
            ],
        }
    }

    #[test]
    fn result_text_is_verbatim() {
        let text = "  Fakturanummer: 1234\n\nTotal: 100 kr  ";
        let shaped = AnalysisResult::shape(
            AnalysisMode::ExtractText,
            "invoice.pdf",
            &two_page_doc(),
            reply(text),
        );
        assert_eq!(shaped.result, text);
    }

    #[test]
    fn metadata_is_carried_through() {
        let shaped = AnalysisResult::shape(
            AnalysisMode::ExtractText,
            "invoice.pdf",
            &two_page_doc(),
            reply("ok"),
        );
        assert_eq!(shaped.filename, "invoice.pdf");
        assert_eq!(shaped.page_count, 2);
        assert_eq!(shaped.source, SourceKind::PdfPages);
        assert_eq!(shaped.mode, AnalysisMode::ExtractText);
        assert!(shaped.error.is_none());
    }

    #[test]
    fn serialises_camel_case_with_null_error() {
        let shaped = AnalysisResult::shape(
            AnalysisMode::FullAnalysis,
            "photo.png",
            &NormalizedDocument {
                kind: SourceKind::Image,
                blocks: vec![ContentBlock::Image {
                    media_type: "image/png".into(),
                    data: "QQ==".into(),
                }],
            },
            reply("a photo"),
        );
        let json = serde_json::to_value(&shaped).unwrap();
        assert_eq!(json["mode"], "fullAnalysis");
        assert_eq!(json["pageCount"], 1);
        assert_eq!(json["source"], "image");
        assert_eq!(json["result"], "a photo");
        assert!(json["error"].is_null());
        assert_eq!(json["inputTokens"], 100);
    }
}
