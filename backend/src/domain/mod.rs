//! Domain error model, result combinators and transactional retry.
//!
//! Purpose: give every layer one closed error taxonomy, combinators that keep
//! failures as values, and a retry engine for transient transactional
//! failures. Nothing here knows about HTTP or a particular database driver;
//! adapters in `inbound` and `outbound` translate at the edges.
//!
//! Public surface:
//! - DomainError (alias to `error::DomainError`): immutable taxonomy error.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Caught / to_base_error: interception and normalisation of failures.
//! - DomainResult and the `try_catch`/`combine`/`traverse`/`sequence` family.
//! - TransactionRetry / retry_transaction: bounded retry with backoff.

pub mod caught;
pub mod error;
pub mod error_log;
pub mod outcome;
pub mod ports;
pub mod transaction_retry;

pub use self::caught::{Caught, UNEXPECTED_FAILURE_MESSAGE, to_base_error};
pub use self::error::{
    DomainError, ErrorCategory, ErrorCode, ErrorKind, ErrorRecord, GENERAL_FIELD,
    ValidationDetail,
};
pub use self::error_log::log_error;
pub use self::outcome::{
    DomainResult, DomainResultExt, combine, combine_async, from_future, from_future_with,
    sequence, sequence_async, traverse, traverse_async, try_catch, try_catch_async,
    try_catch_async_with, try_catch_with,
};
pub use self::transaction_retry::{
    RetryClassification, RetryPolicy, RetrySleeper, TokioSleeper, TransactionRetry, classify,
    execute_transaction, is_retryable_error, retry_transaction, retry_transaction_with_sleeper,
};
