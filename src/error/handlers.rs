//! Error handlers
//!
//! Maps errors to HTTP status codes and renders them as responses.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::error::types::{ApiError, StoreError};

/// Convert error to HTTP status code
pub fn error_to_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Store(StoreError::UnknownCategory(_)) => StatusCode::BAD_REQUEST,
        ApiError::Store(StoreError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
        ApiError::Store(StoreError::InvalidName(_)) => StatusCode::BAD_REQUEST,
        ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ApiError::Store(StoreError::AlreadyExists(_)) => StatusCode::CONFLICT,
        ApiError::Store(StoreError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::Usage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::NoFiles => StatusCode::BAD_REQUEST,
        ApiError::TooManyFiles(_) => StatusCode::BAD_REQUEST,
        ApiError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_to_status(&self);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// Extractor rejections share the JSON error shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::UsageError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(StoreError::NotFound("a.txt".into()));
        assert_eq!(error_to_status(&not_found), StatusCode::NOT_FOUND);

        let io = ApiError::from(StoreError::Io(std::io::Error::other("disk gone")));
        assert_eq!(error_to_status(&io), StatusCode::INTERNAL_SERVER_ERROR);

        let host = ApiError::from(UsageError::HostQuery("statvfs".into()));
        assert_eq!(error_to_status(&host), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(error_to_status(&ApiError::NoFiles), StatusCode::BAD_REQUEST);
    }
}
