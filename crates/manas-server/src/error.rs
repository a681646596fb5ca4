//! API error handling

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use manas_core::Error;
use serde_json::json;
use tracing::{error, warn};

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    fn error_type(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => "invalid_request_error",
            StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
            _ => "server_error",
        }
    }

    /// Map a core error, substituting `public_message` for anything that
    /// would otherwise leak internal detail
    fn from_core(err: Error, public_message: &str) -> Self {
        match err {
            Error::ModelNotLoaded(_) | Error::Overloaded => {
                warn!("{}", err);
                ApiError::service_unavailable(err.to_string())
            }
            Error::InvalidInput(msg) => ApiError::bad_request(msg),
            other => {
                error!(error = %other, "{}", public_message);
                ApiError::internal(public_message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.message,
            "error": {
                "message": self.message,
                "type": self.error_type(),
                "code": self.status.as_u16()
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::from_core(err, "Internal server error")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: format!("Invalid multipart body: {}", err.body_text()),
        }
    }
}

/// Attach an endpoint-specific public message to a core result
pub trait ResultExt<T> {
    fn public_error(self, message: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for manas_core::Result<T> {
    fn public_error(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_core(err, message))
    }
}
