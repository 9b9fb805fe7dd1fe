//! Request handlers for the analysis endpoints.

use super::error::ApiError;
use super::AppState;
use crate::analyze::{AnalysisRequest, UploadedFile};
use crate::output::AnalysisResult;
use crate::prompts::{AnalysisMode, ResponseLanguage};
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

/// Liveness probe; never touches the pipeline.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/v1/analyze`: full analysis of the upload.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let (file, language, _) = form.into_parts()?;
    let request = AnalysisRequest::full_analysis(language);
    Ok(Json(state.analyzer.analyze(&file, &request).await?))
}

/// `POST /api/v1/extract-text`: OCR-style text extraction.
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let (file, _, _) = form.into_parts()?;
    let request = AnalysisRequest::extract_text();
    Ok(Json(state.analyzer.analyze(&file, &request).await?))
}

/// `POST /api/v1/describe`: visual description.
pub async fn describe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let (file, language, _) = form.into_parts()?;
    let request = AnalysisRequest::describe(language);
    Ok(Json(state.analyzer.analyze(&file, &request).await?))
}

/// `POST /api/v1/query`: answer a caller-supplied question.
///
/// The `query` field is passed through as-is; an absent or blank question
/// surfaces as `MissingQuery` from the request builder.
pub async fn query(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let (file, language, query) = form.into_parts()?;
    let request = AnalysisRequest {
        mode: AnalysisMode::CustomQuery,
        query,
        language,
    };
    Ok(Json(state.analyzer.analyze(&file, &request).await?))
}

/// The multipart fields the endpoints understand.
struct UploadForm {
    file: Option<UploadedFile>,
    language: Option<String>,
    query: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self {
            file: None,
            language: None,
            query: None,
        };

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or("upload").to_string();
                    let bytes = field.bytes().await?;
                    form.file = Some(UploadedFile::new(filename, bytes));
                }
                "language" => form.language = Some(field.text().await?),
                "query" => form.query = Some(field.text().await?),
                other => {
                    tracing::debug!(field = other, "ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }

    fn into_parts(self) -> Result<(UploadedFile, ResponseLanguage, Option<String>), ApiError> {
        let file = self
            .file
            .ok_or_else(|| ApiError::InvalidRequest("missing 'file' field".into()))?;

        let language = match self.language.as_deref().map(str::trim) {
            None | Some("") => ResponseLanguage::default(),
            Some(raw) => ResponseLanguage::parse(raw).ok_or_else(|| {
                ApiError::InvalidRequest(format!(
                    "unknown language '{raw}' (expected 'swedish' or 'english')"
                ))
            })?,
        };

        Ok((file, language, self.query))
    }
}
