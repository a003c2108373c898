//! Response envelope and handler errors.
//!
//! # Responsibilities
//! - Wrap every diagnostic payload in `{code, message?, data?}`
//! - Map handler errors to the same envelope with a 5xx/4xx code
//!
//! # Design Decisions
//! - Serialization failures become a plain-text 500 carrying the error text
//! - `code` in the body always matches the HTTP status

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// JSON envelope shared by all diagnostic routes.
#[derive(Debug, Clone, Serialize)]
pub struct JsonResult<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonResult<T> {
    /// `200` with data and no message.
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: String::new(),
            data: Some(data),
        }
    }
}

impl JsonResult<()> {
    /// Envelope without data.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for JsonResult<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(&self) {
            Ok(body) => {
                (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

/// Error returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Handler failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        JsonResult::message(status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_fields_are_omitted() {
        let response = JsonResult::ok(serde_json::json!({"alive": true})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, r#"{"code":200,"data":{"alive":true}}"#);

        let response = JsonResult::message(StatusCode::ACCEPTED, "queued").into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_string(response).await, r#"{"code":202,"message":"queued"}"#);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("payload refused"))
        }
    }

    #[tokio::test]
    async fn test_serialization_failure_is_plain_500() {
        let response = JsonResult::ok(Unserializable).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("payload refused"));
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        let response = ApiError::internal("database unavailable").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"code":500,"message":"database unavailable"}"#
        );

        let response = ApiError::NotFound("no such thing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
