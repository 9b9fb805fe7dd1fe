//! HTTP error mapping for the analysis pipeline.

use crate::error::AnalysisError;
use crate::output::ErrorBody;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Everything a handler can fail with: a pipeline error, or a request that
/// never made it into the pipeline (missing form field, unknown language).
#[derive(Debug)]
pub enum ApiError {
    Pipeline(AnalysisError),
    InvalidRequest(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::InvalidRequest(format!("invalid multipart body: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest".to_string(),
                message.clone(),
            ),
            ApiError::Pipeline(err) => {
                let status = match err {
                    AnalysisError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    e if e.is_client_error() => StatusCode::BAD_REQUEST,
                    AnalysisError::ProviderRejected { .. } => StatusCode::BAD_GATEWAY,
                    AnalysisError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind().to_string(), err.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, %kind, %message, "request failed");
        } else {
            tracing::debug!(%status, %kind, %message, "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { kind, message },
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::MissingQuery)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::EmptyDocument {
                detail: "x".into()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::InvalidRequest("missing 'file' field".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn size_limit_maps_to_413() {
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::FileTooLarge {
                size: 2,
                max: 1
            })),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn provider_errors_map_to_gateway_statuses() {
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::ProviderRejected {
                status: 401,
                message: "bad key".into()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::ProviderUnavailable {
                detail: "timeout".into()
            })),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn faults_map_to_500() {
        assert_eq!(
            status_of(ApiError::Pipeline(AnalysisError::Internal("boom".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
