use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    PendingApproval,
    NoAreaAssigned,
    InvalidReport,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

use crate::{
    domain::{EvidenceError, TrackingError},
    repositories::RepositoryError,
};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                Self::internal("database error")
            }
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
        }
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::Evaluation(_) => {
                Self::bad_request(err.to_string()).with_code(ErrorCode::InvalidReport)
            }
            TrackingError::Validation(_) => Self::bad_request(err.to_string()),
            TrackingError::NotFound(_) => Self::not_found(err.to_string()),
            TrackingError::NoAreaAssigned => {
                Self::forbidden(err.to_string()).with_code(ErrorCode::NoAreaAssigned)
            }
            TrackingError::Forbidden(_) => Self::forbidden(err.to_string()),
            TrackingError::Conflict(_) => Self::conflict(err.to_string()),
            TrackingError::Storage(message) => {
                tracing::error!("Tracking operation failed: {}", message);
                Self::internal("storage error")
            }
        }
    }
}

impl From<EvidenceError> for ApiError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::NotFound => Self::not_found(err.to_string()),
            EvidenceError::InvalidPath | EvidenceError::EmptyPayload => {
                Self::bad_request(err.to_string())
            }
            EvidenceError::PayloadTooLarge => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            EvidenceError::Forbidden => Self::forbidden(err.to_string()),
            EvidenceError::NoAreaAssigned => {
                Self::forbidden(err.to_string()).with_code(ErrorCode::NoAreaAssigned)
            }
            EvidenceError::Upload(ref message) | EvidenceError::Signing(ref message) => {
                tracing::error!("Evidence operation failed: {}", message);
                Self::internal("evidence storage error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use progress_core::EvaluationError;

    async fn body_json(err: ApiError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn tracking_errors_map_to_status_codes() {
        let cases = [
            (
                TrackingError::Evaluation(EvaluationError::MissingComment),
                StatusCode::BAD_REQUEST,
            ),
            (TrackingError::validation("bad"), StatusCode::BAD_REQUEST),
            (TrackingError::not_found("area"), StatusCode::NOT_FOUND),
            (TrackingError::NoAreaAssigned, StatusCode::FORBIDDEN),
            (
                TrackingError::Forbidden("contribution".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                TrackingError::Conflict("duplicate".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                TrackingError::storage("connection reset"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn evidence_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(EvidenceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(EvidenceError::PayloadTooLarge).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(EvidenceError::InvalidPath).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EvidenceError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(EvidenceError::Signing("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn no_area_body_carries_code() {
        let body = body_json(TrackingError::NoAreaAssigned.into()).await;

        assert_eq!(body["error"], "no area assigned");
        assert_eq!(body["code"], "NO_AREA_ASSIGNED");
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() {
        let body = body_json(TrackingError::storage("password authentication failed").into()).await;

        assert_eq!(body["error"], "storage error");
        assert!(body.get("code").is_none());
    }
}
