//! Result propagation combinators.
//!
//! Every function here returns failures as [`DomainError`] values. Panics
//! raised inside a guarded unit of work are intercepted at the boundary and
//! normalised through [`to_base_error`]; nothing in this module unwinds.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use futures_util::future::join_all;
use serde_json::Value;

use super::error_log::log_error;
use super::{Caught, DomainError, to_base_error};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

fn normalise<X>(caught: Caught, transform: X) -> DomainError
where
    X: FnOnce(&Caught) -> Option<DomainError>,
{
    match transform(&caught) {
        Some(err) => err,
        None => to_base_error(caught),
    }
}

/// Run a synchronous unit of work, converting returned errors and panics into
/// a [`DomainError`].
///
/// # Examples
/// ```
/// use faultline::domain::{try_catch, ErrorCode};
///
/// let parsed = try_catch(|| "42".parse::<u32>().map_err(|e| e.to_string()));
/// assert_eq!(parsed, Ok(42));
///
/// let failed = try_catch(|| "x".parse::<u32>().map_err(|e| e.to_string()));
/// assert_eq!(failed.map_err(|e| e.code()), Err(ErrorCode::UnknownError));
/// ```
pub fn try_catch<T, E, F>(op: F) -> DomainResult<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Caught>,
{
    try_catch_with(op, |_| None)
}

/// Like [`try_catch`], but lets `transform` classify the failure first.
///
/// When `transform` returns `None` the failure falls back to
/// [`to_base_error`].
pub fn try_catch_with<T, E, F, X>(op: F, transform: X) -> DomainResult<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Caught>,
    X: FnOnce(&Caught) -> Option<DomainError>,
{
    let caught = match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => err.into(),
        Err(payload) => Caught::from_panic(payload),
    };
    Err(normalise(caught, transform))
}

/// Await a future, converting its error or a panic during polling into a
/// [`DomainError`].
pub async fn from_future<T, E, Fut>(future: Fut) -> DomainResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<Caught>,
{
    from_future_with(future, |_| None).await
}

/// Like [`from_future`], but lets `transform` classify the failure first.
pub async fn from_future_with<T, E, Fut, X>(future: Fut, transform: X) -> DomainResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<Caught>,
    X: FnOnce(&Caught) -> Option<DomainError>,
{
    let caught = match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => err.into(),
        Err(payload) => Caught::from_panic(payload),
    };
    Err(normalise(caught, transform))
}

/// Build and await an asynchronous unit of work.
///
/// Panics raised while `op` constructs the future are intercepted as well as
/// those raised while it is polled.
pub async fn try_catch_async<T, E, F, Fut>(op: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Caught>,
{
    try_catch_async_with(op, |_| None).await
}

/// Like [`try_catch_async`], but lets `transform` classify the failure first.
pub async fn try_catch_async_with<T, E, F, Fut, X>(op: F, transform: X) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Caught>,
    X: FnOnce(&Caught) -> Option<DomainError>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(future) => from_future_with(future, transform).await,
        Err(payload) => Err(normalise(Caught::from_panic(payload), transform)),
    }
}

/// Collect results in order, returning the first failure if any.
///
/// Inputs after the first failure are not inspected.
///
/// # Examples
/// ```
/// use faultline::domain::{combine, DomainError};
///
/// let err = DomainError::conflict("stale");
/// assert_eq!(combine(vec![Ok(1), Ok(2), Err(err.clone())]), Err(err));
/// assert_eq!(combine::<u8, _>(vec![Ok(1), Ok(2)]), Ok(vec![1, 2]));
/// ```
pub fn combine<T, I>(results: I) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = DomainResult<T>>,
{
    results.into_iter().collect()
}

/// Apply `f` to every item, then [`combine`] the results.
///
/// Unlike [`sequence`], every item is mapped even when an early one fails.
pub fn traverse<A, T, I, F>(items: I, f: F) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> DomainResult<T>,
{
    let mapped: Vec<DomainResult<T>> = items.into_iter().map(f).collect();
    combine(mapped)
}

/// Invoke thunks in order, stopping at the first failure.
pub fn sequence<T, I, F>(operations: I) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> DomainResult<T>,
{
    let mut values = Vec::new();
    for operation in operations {
        values.push(operation()?);
    }
    Ok(values)
}

/// Await every future concurrently, then [`combine`] in input order.
pub async fn combine_async<T, I, Fut>(futures: I) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = DomainResult<T>>,
{
    combine(join_all(futures).await)
}

/// Start `f` for every item, await them concurrently, then [`combine`].
pub async fn traverse_async<A, T, I, F, Fut>(items: I, f: F) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    combine_async(items.into_iter().map(f)).await
}

/// Await thunks one at a time, stopping at the first failure.
pub async fn sequence_async<T, I, F, Fut>(operations: I) -> DomainResult<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let mut values = Vec::new();
    for operation in operations {
        values.push(operation().await?);
    }
    Ok(values)
}

/// Logging helpers for domain results.
pub trait DomainResultExt {
    /// Emit the failure through [`log_error`] and pass the result on.
    #[must_use]
    fn log_on_err(self, context: Option<&Value>) -> Self;
}

impl<T> DomainResultExt for DomainResult<T> {
    fn log_on_err(self, context: Option<&Value>) -> Self {
        if let Err(err) = &self {
            log_error(err, context);
        }
        self
    }
}
