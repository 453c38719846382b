//! HTTP inbound adapter rendering domain errors for Actix handlers.

pub mod error;

pub use error::{ErrorBody, ErrorResponse, create_error_response};
