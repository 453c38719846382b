//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Caught, DomainError, ErrorCode, ValidationDetail, to_base_error};

/// Caller-facing error envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// The error payload.
    pub error: ErrorBody,
}

/// Body of an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// HTTP status classification.
    pub status_code: u16,
    /// Validation violations, only when requested and present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationDetail>>,
}

/// Build the caller-facing envelope for `error`.
///
/// `details` is populated only when `include_details` is set and the error
/// carries validation violations. The message is passed through as is; use
/// the [`ResponseError`] implementation for redacted output.
///
/// # Examples
/// ```
/// use faultline::domain::{DomainError, ValidationDetail};
/// use faultline::inbound::http::error::create_error_response;
///
/// let err = DomainError::validation(vec![ValidationDetail::new("email", "is required")]);
/// let response = create_error_response(&err, true);
/// assert_eq!(response.error.status_code, 400);
/// assert_eq!(response.error.details.map(|d| d.len()), Some(1));
/// ```
pub fn create_error_response(error: &DomainError, include_details: bool) -> ErrorResponse {
    let details = include_details
        .then(|| error.validation_errors().map(<[ValidationDetail]>::to_vec))
        .flatten();
    ErrorResponse {
        error: ErrorBody {
            code: error.code(),
            message: error.message().to_owned(),
            status_code: error.status_code(),
            details,
        },
    }
}

const fn generic_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::DatabaseError => "Database error",
        ErrorCode::ConnectionError | ErrorCode::ServiceUnavailable => {
            "Service temporarily unavailable"
        }
        ErrorCode::ExternalServiceError => "Upstream service error",
        ErrorCode::Timeout => "Request timed out",
        _ => "Internal server error",
    }
}

fn redact_if_systemic(error: &DomainError) -> ErrorResponse {
    let mut response = create_error_response(error, false);
    if !error.is_operational() {
        response.error.message = generic_message(error.code()).to_owned();
    }
    response
}

fn status_for(error: &DomainError) -> StatusCode {
    StatusCode::from_u16(DomainError::status_code(error))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(status_for(self)).json(redact_if_systemic(self))
    }
}

impl From<actix_web::Error> for DomainError {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        // Actix errors are not `Send`; normalise their text instead.
        to_base_error(Caught::from(err.to_string()))
    }
}

#[cfg(test)]
mod tests;
