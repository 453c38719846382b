//! Retryability classification for transactional failures.

use crate::domain::DomainError;

/// Backend condition code for a write conflict or serialization failure.
pub const TRANSACTION_CONFLICT_CODE: &str = "P2034";
/// Backend condition code for a statement or connection-wait timeout.
pub const STATEMENT_TIMEOUT_CODE: &str = "P2024";
/// Backend condition code for a relation that could not be resolved.
pub const UNRESOLVED_RELATION_CODE: &str = "P2025";

/// Backend condition codes treated as transient.
pub const TRANSIENT_CONDITION_CODES: [&str; 3] = [
    TRANSACTION_CONFLICT_CODE,
    STATEMENT_TIMEOUT_CODE,
    UNRESOLVED_RELATION_CODE,
];

// Lowercase fragments matched against the error message. This over-matches
// (e.g. a validation message mentioning "conflict") and is kept as is.
const TRANSIENT_MESSAGE_MARKERS: [&str; 4] =
    ["deadlock", "timeout", "conflict", "could not serialize"];

/// Outcome of classifying a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClassification {
    /// Re-running the unit of work may succeed.
    Retryable,
    /// Retrying cannot help.
    Terminal,
}

/// Classify `error`, checking its backend condition code before its message.
pub fn classify(error: &DomainError) -> RetryClassification {
    if error
        .backend_code()
        .is_some_and(|code| TRANSIENT_CONDITION_CODES.contains(&code))
    {
        return RetryClassification::Retryable;
    }
    let message = error.message().to_lowercase();
    if TRANSIENT_MESSAGE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        RetryClassification::Retryable
    } else {
        RetryClassification::Terminal
    }
}

/// Whether `error` is worth another attempt.
///
/// # Examples
/// ```
/// use faultline::domain::{is_retryable_error, DomainError};
///
/// assert!(is_retryable_error(&DomainError::database_with_code("write skew", "P2034")));
/// assert!(is_retryable_error(&DomainError::database("Deadlock detected")));
/// assert!(!is_retryable_error(&DomainError::validation(Vec::new())));
/// ```
pub fn is_retryable_error(error: &DomainError) -> bool {
    classify(error) == RetryClassification::Retryable
}
