//! Structured logging for taxonomy errors.

use serde_json::Value;
use tracing::{error, warn};

use super::DomainError;

/// Emit `err` as a structured log event.
///
/// Operational errors log at `warn`; everything else logs at `error`. Both
/// carry the code, status, operational flag, captured stack and the optional
/// caller context.
pub fn log_error(err: &DomainError, context: Option<&Value>) {
    let stack = err.stack().unwrap_or_default();
    let context = context.map(Value::to_string).unwrap_or_default();
    if err.is_operational() {
        warn!(
            code = %err.code(),
            status_code = err.status_code(),
            operational = true,
            stack = %stack,
            context = %context,
            error_message = %err.message(),
            "operational error"
        );
    } else {
        error!(
            code = %err.code(),
            status_code = err.status_code(),
            operational = false,
            stack = %stack,
            context = %context,
            error_message = %err.message(),
            "systemic error"
        );
    }
}
