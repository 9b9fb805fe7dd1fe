//! Request assembly: content blocks + mode + language → provider message parts.
//!
//! The assembled message is an ordered list of content parts: every document
//! part first, in original order, then exactly one instruction part. Putting
//! the content before the instruction grounds the model in what it is being
//! asked about; the ordering is a fixed convention and must not change.

use crate::error::AnalysisError;
use crate::pipeline::normalize::{ContentBlock, NormalizedDocument};
use crate::prompts::{self, AnalysisMode, ResponseLanguage};
use serde::Serialize;

/// One part of the provider message, in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Image { source: ImageSource },
    Text { text: String },
}

/// Base64 image source, as the messages API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    fn base64(media_type: String, data: String) -> Self {
        Self {
            source_type: "base64",
            media_type,
            data,
        }
    }
}

/// Assemble the outbound message content.
///
/// Fails with [`AnalysisError::MissingQuery`] iff `mode` is
/// [`AnalysisMode::CustomQuery`] and `query` is absent or blank; a non-empty
/// question is included verbatim in the instruction part.
pub fn build_content(
    doc: &NormalizedDocument,
    filename: &str,
    mode: AnalysisMode,
    query: Option<&str>,
    language: ResponseLanguage,
) -> Result<Vec<ContentPart>, AnalysisError> {
    let mut parts: Vec<ContentPart> = Vec::with_capacity(doc.blocks.len() + 1);

    for block in &doc.blocks {
        match block {
            ContentBlock::Image { media_type, data } => parts.push(ContentPart::Image {
                source: ImageSource::base64(media_type.clone(), data.clone()),
            }),
            // Text extracted from a document is labelled with its source so
            // the model can tell it apart from the instruction.
            ContentBlock::Text { text } => parts.push(ContentPart::Text {
                text: format!("[Document text from {filename}]:\n{text}"),
            }),
        }
    }

    let mut instruction = prompts::instruction_for(mode, language, query)?;
    let image_count = doc.image_count();
    if image_count > 1 {
        instruction.push_str(&prompts::page_labelling_hint(image_count));
    }
    parts.push(ContentPart::Text { text: instruction });

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::SourceKind;

    fn image_block(n: u8) -> ContentBlock {
        ContentBlock::Image {
            media_type: "image/png".into(),
            data: format!("cGFnZQ{n}"),
        }
    }

    fn pdf_doc(pages: usize) -> NormalizedDocument {
        NormalizedDocument {
            kind: SourceKind::PdfPages,
            blocks: (0..pages).map(|i| image_block(i as u8)).collect(),
        }
    }

    #[test]
    fn content_precedes_instruction() {
        let doc = pdf_doc(2);
        let parts = build_content(
            &doc,
            "scan.pdf",
            AnalysisMode::ExtractText,
            None,
            ResponseLanguage::Swedish,
        )
        .unwrap();

        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], ContentPart::Image { .. }));
        assert!(matches!(parts[1], ContentPart::Image { .. }));
        assert!(matches!(parts[2], ContentPart::Text { .. }));
    }

    #[test]
    fn multi_page_document_gets_labelling_hint() {
        let doc = pdf_doc(3);
        let parts = build_content(
            &doc,
            "scan.pdf",
            AnalysisMode::Describe,
            None,
            ResponseLanguage::English,
        )
        .unwrap();
        let ContentPart::Text { text } = parts.last().unwrap() else {
            panic!("last part must be the instruction");
        };
        assert!(text.contains("3 pages"), "got: {text}");
        assert!(text.contains("Page 1"), "got: {text}");
    }

    #[test]
    fn single_image_gets_no_labelling_hint() {
        let doc = pdf_doc(1);
        let parts = build_content(
            &doc,
            "scan.pdf",
            AnalysisMode::Describe,
            None,
            ResponseLanguage::English,
        )
        .unwrap();
        let ContentPart::Text { text } = parts.last().unwrap() else {
            panic!("last part must be the instruction");
        };
        assert!(!text.contains("pages, provided as images"), "got: {text}");
    }

    #[test]
    fn text_block_is_wrapped_with_source() {
        let doc = NormalizedDocument {
            kind: SourceKind::DocText,
            blocks: vec![ContentBlock::Text {
                text: "Invoice #1\nTotal: 100".into(),
            }],
        };
        let parts = build_content(
            &doc,
            "invoice.docx",
            AnalysisMode::FullAnalysis,
            None,
            ResponseLanguage::Swedish,
        )
        .unwrap();

        let ContentPart::Text { text } = &parts[0] else {
            panic!("first part must be the document text");
        };
        assert!(text.starts_with("[Document text from invoice.docx]:\n"));
        assert!(text.ends_with("Invoice #1\nTotal: 100"));
    }

    #[test]
    fn custom_query_text_appears_verbatim() {
        let doc = pdf_doc(1);
        let parts = build_content(
            &doc,
            "scan.pdf",
            AnalysisMode::CustomQuery,
            Some("How many line items are there?"),
            ResponseLanguage::English,
        )
        .unwrap();
        let ContentPart::Text { text } = parts.last().unwrap() else {
            panic!("last part must be the instruction");
        };
        assert!(text.contains("How many line items are there?"));
    }

    #[test]
    fn custom_query_without_question_fails() {
        let doc = pdf_doc(1);
        let err = build_content(
            &doc,
            "scan.pdf",
            AnalysisMode::CustomQuery,
            None,
            ResponseLanguage::Swedish,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingQuery));
    }

    #[test]
    fn image_source_serialises_to_wire_shape() {
        let part = ContentPart::Image {
            source: ImageSource::base64("image/png".into(), "QUJD".into()),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": "image/png",
                    "data": "QUJD"
                }
            })
        );
    }
}
