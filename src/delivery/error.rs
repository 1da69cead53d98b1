use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::imaging::ImagingError;

/// Terminal rejection of an asset request
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no content type registered for '{0}'")]
    UnknownExtension(String),
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("width and height bounds must be positive integers")]
    InvalidBounds,
    #[error("asset '{path}' could not be decoded: {source}")]
    DecodeFailure {
        path: String,
        #[source]
        source: ImagingError,
    },
    #[error("asset '{path}' is larger than the {limit} byte transform limit")]
    SourceTooLarge { path: String, limit: u64 },
    #[error("thumbnail generation failed for '{path}': {reason}")]
    TransformFailure { path: String, reason: String },
}

impl DeliveryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeliveryError::UnknownExtension(_) => StatusCode::NOT_FOUND,
            DeliveryError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            DeliveryError::InvalidBounds => StatusCode::BAD_REQUEST,
            DeliveryError::DecodeFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DeliveryError::SourceTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DeliveryError::TransformFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DeliveryError::UnknownExtension(_) => "UNKNOWN_EXTENSION",
            DeliveryError::AssetNotFound(_) => "NOT_FOUND",
            DeliveryError::InvalidBounds => "INVALID_BOUNDS",
            DeliveryError::DecodeFailure { .. } => "DECODE_FAILURE",
            DeliveryError::SourceTooLarge { .. } => "SOURCE_TOO_LARGE",
            DeliveryError::TransformFailure { .. } => "TRANSFORM_FAILURE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Not-found carries no body
        if self.is_not_found() {
            return status.into_response();
        }

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
