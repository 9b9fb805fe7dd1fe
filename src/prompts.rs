//! Analysis modes, response languages, and their instruction templates.
//!
//! Centralising every prompt here keeps a single source of truth (changing
//! the wording of a task means editing exactly one place) and lets unit
//! tests inspect the assembled instruction without calling a real model.
//!
//! The per-page breakdown for multi-page documents is prompt-driven: the
//! model is asked to label pages itself. Responses are never split
//! structurally, so there is no machine-parseable page boundary to rely on.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// The analysis task requested by the caller. Selects the instruction
/// template appended after the document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisMode {
    /// Text extraction + description + document type + key facts + summary.
    FullAnalysis,
    /// OCR-style extraction of all visible text.
    ExtractText,
    /// Visual description of the content.
    Describe,
    /// A caller-supplied question about the document.
    CustomQuery,
}

impl AnalysisMode {
    /// Wire name, as it appears in the response body.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::FullAnalysis => "fullAnalysis",
            AnalysisMode::ExtractText => "extractText",
            AnalysisMode::Describe => "describe",
            AnalysisMode::CustomQuery => "customQuery",
        }
    }
}

/// Language the model is asked to respond in. Affects only the instruction
/// text, never normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLanguage {
    /// The default: the service's original deployment is Swedish-first.
    #[default]
    Swedish,
    English,
}

impl ResponseLanguage {
    /// Name interpolated into the instruction templates.
    pub fn display_name(self) -> &'static str {
        match self {
            ResponseLanguage::Swedish => "Swedish",
            ResponseLanguage::English => "English",
        }
    }

    /// Parse a form-field value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "swedish" => Some(ResponseLanguage::Swedish),
            "english" => Some(ResponseLanguage::English),
            _ => None,
        }
    }
}

/// Build the instruction text for a mode.
///
/// `query` is required iff `mode` is [`AnalysisMode::CustomQuery`]; an absent
/// or blank question fails with [`AnalysisError::MissingQuery`]. The question
/// text is included verbatim.
pub fn instruction_for(
    mode: AnalysisMode,
    language: ResponseLanguage,
    query: Option<&str>,
) -> Result<String, AnalysisError> {
    let lang = language.display_name();
    let text = match mode {
        AnalysisMode::FullAnalysis => format!(
            "Analyze the provided image(s)/document(s). Respond in {lang}. Do the following:\n\
             1. **Text extraction**: Extract all visible text, preserving structure.\n\
             2. **Image description**: Describe what you see: objects, layout, colors, people.\n\
             3. **Document type**: Identify the type of document (invoice, receipt, letter, photo, etc.).\n\
             4. **Key information**: Highlight the most important information found.\n\
             5. **Summary**: Provide a brief summary of the content."
        ),
        AnalysisMode::ExtractText => format!(
            "Extract ALL text visible in the image(s). \
             Preserve the original layout and structure as much as possible. \
             If there are tables, format them clearly. \
             If text is in multiple languages, note the language for each section \
             (write such notes in {lang}). \
             Return ONLY the extracted text, no commentary."
        ),
        AnalysisMode::Describe => format!(
            "Describe in detail what you see in the image(s). Respond in {lang}. \
             Include: objects, people, text, colors, layout, and any notable details."
        ),
        AnalysisMode::CustomQuery => {
            let question = query.map(str::trim).filter(|q| !q.is_empty());
            let question = question.ok_or(AnalysisError::MissingQuery)?;
            format!("Respond in {lang}.\n\n{question}")
        }
    };
    Ok(text)
}

/// Extra instruction appended when the document yielded more than one image
/// block (multi-page PDF). The model delimits pages itself; see the module
/// docs for the limits of that.
pub fn page_labelling_hint(pages: usize) -> String {
    format!(
        "\n\nThe document has {pages} pages, provided as images in order. \
         Address every page and label each part of your answer with its page \
         number (\"Page 1\", \"Page 2\", ...)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_analysis_mentions_language() {
        let text =
            instruction_for(AnalysisMode::FullAnalysis, ResponseLanguage::English, None).unwrap();
        assert!(text.contains("Respond in English"));
        assert!(text.contains("Summary"));
    }

    #[test]
    fn extract_text_demands_text_only() {
        let text =
            instruction_for(AnalysisMode::ExtractText, ResponseLanguage::Swedish, None).unwrap();
        assert!(text.contains("ONLY the extracted text"));
    }

    #[test]
    fn custom_query_includes_question_verbatim() {
        let text = instruction_for(
            AnalysisMode::CustomQuery,
            ResponseLanguage::Swedish,
            Some("What is the invoice total?"),
        )
        .unwrap();
        assert!(text.contains("What is the invoice total?"));
        assert!(text.contains("Respond in Swedish."));
    }

    #[test]
    fn custom_query_without_question_fails() {
        let err = instruction_for(AnalysisMode::CustomQuery, ResponseLanguage::Swedish, None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingQuery));

        let err = instruction_for(
            AnalysisMode::CustomQuery,
            ResponseLanguage::Swedish,
            Some("   "),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingQuery));
    }

    #[test]
    fn other_modes_ignore_query() {
        // A stray query field on a non-query mode must not fail or leak in.
        let text = instruction_for(
            AnalysisMode::Describe,
            ResponseLanguage::English,
            Some("ignored"),
        )
        .unwrap();
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn language_parse_is_case_insensitive() {
        assert_eq!(
            ResponseLanguage::parse("SWEDISH"),
            Some(ResponseLanguage::Swedish)
        );
        assert_eq!(
            ResponseLanguage::parse(" english "),
            Some(ResponseLanguage::English)
        );
        assert_eq!(ResponseLanguage::parse("klingon"), None);
    }

    #[test]
    fn mode_wire_names() {
        assert_eq!(AnalysisMode::FullAnalysis.as_str(), "fullAnalysis");
        assert_eq!(AnalysisMode::CustomQuery.as_str(), "customQuery");
        let json = serde_json::to_string(&AnalysisMode::ExtractText).unwrap();
        assert_eq!(json, "\"extractText\"");
    }
}
