//! Application error type and its HTTP mapping.
//!
//! Every failure a handler or middleware can produce collapses into one of
//! five categories, each carrying the client-facing message. The
//! `ResponseError` impl renders them all through the same JSON failure
//! envelope, so clients see a single error shape no matter where a request
//! died. Storage-level detail never lands here; it is logged at the failure
//! site and converted before it reaches this type.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl StdError for AppError {}

/// Failure half of the response envelope.
///
/// Success responses are built in [`crate::response`]; both shapes share
/// the `statusCode` / `message` / `success` fields.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
}

impl FailureBody {
    pub fn new(status_code: u16, message: String) -> Self {
        Self {
            status_code,
            success: false,
            message,
            errors: Vec::new(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        HttpResponse::build(status).json(FailureBody::new(status.as_u16(), self.to_string()))
    }
}
