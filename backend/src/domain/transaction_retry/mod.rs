//! Transactional retry engine.
//!
//! Runs a unit of work through a [`TransactionRunner`], normalising every
//! failure into the taxonomy and re-running transient failures with capped
//! exponential backoff. Attempts within one call are strictly sequential and
//! the engine keeps no state between calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::domain::outcome::{DomainResult, from_future};
use crate::domain::ports::{TransactionOptions, TransactionRunner, UnitOfWork};
use crate::domain::DomainError;

mod classify;
mod policy;
mod runtime;

pub use classify::{
    RetryClassification, STATEMENT_TIMEOUT_CODE, TRANSACTION_CONFLICT_CODE,
    TRANSIENT_CONDITION_CODES, UNRESOLVED_RELATION_CODE, classify, is_retryable_error,
};
pub use policy::RetryPolicy;
pub use runtime::TokioSleeper;

/// Async clock-independent sleeping abstraction for backoff.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Run `work` once inside a transaction.
///
/// Returned failures and panics raised by the unit of work are normalised
/// through [`to_base_error`](crate::domain::to_base_error).
pub async fn execute_transaction<R, W>(
    runner: &R,
    work: &W,
    options: &TransactionOptions,
) -> DomainResult<W::Output>
where
    R: TransactionRunner + ?Sized,
    W: UnitOfWork<R::Connection> + ?Sized,
{
    from_future(runner.run_transaction(work, options)).await
}

/// Run `work` under `policy`, sleeping on the Tokio timer between attempts.
pub async fn retry_transaction<R, W>(
    runner: &R,
    work: &W,
    policy: &RetryPolicy,
) -> DomainResult<W::Output>
where
    R: TransactionRunner + ?Sized,
    W: UnitOfWork<R::Connection> + ?Sized,
{
    retry_transaction_with_sleeper(runner, work, policy, &TokioSleeper).await
}

/// Run `work` under `policy` using `sleeper` for backoff.
///
/// Returns the first success, the first terminal failure, or the last
/// retryable failure once `policy.max_attempts` attempts have been made.
pub async fn retry_transaction_with_sleeper<R, W, S>(
    runner: &R,
    work: &W,
    policy: &RetryPolicy,
    sleeper: &S,
) -> DomainResult<W::Output>
where
    R: TransactionRunner + ?Sized,
    W: UnitOfWork<R::Connection> + ?Sized,
    S: RetrySleeper + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut state = RetryState::Attempting { attempt: 0 };

    loop {
        state = match state {
            RetryState::Attempting { attempt } => {
                match execute_transaction(runner, work, &policy.transaction).await {
                    Ok(value) => RetryState::Done(Ok(value)),
                    Err(err) => after_failure(attempt, max_attempts, err),
                }
            }
            RetryState::Backoff { attempt, last_error } => {
                let delay = policy.backoff_delay(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    code = %last_error.code(),
                    error_message = %last_error.message(),
                    "retryable transaction failure, backing off"
                );
                sleeper.sleep(delay).await;
                RetryState::Attempting { attempt }
            }
            RetryState::Done(result) => return result,
        };
    }
}

enum RetryState<T> {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, last_error: DomainError },
    Done(DomainResult<T>),
}

fn after_failure<T>(attempt: u32, max_attempts: u32, err: DomainError) -> RetryState<T> {
    if !is_retryable_error(&err) {
        debug!(attempt, code = %err.code(), "terminal transaction failure");
        return RetryState::Done(Err(err));
    }
    let next = attempt.saturating_add(1);
    if next < max_attempts {
        RetryState::Backoff {
            attempt: next,
            last_error: err,
        }
    } else {
        error!(
            attempts = next,
            code = %err.code(),
            error_message = %err.message(),
            "transaction retries exhausted"
        );
        RetryState::Done(Err(err))
    }
}

/// Retry engine bound to one runner and policy.
///
/// # Examples
/// ```rust,ignore
/// let engine = TransactionRetry::new(DieselTransactionRunner::new(pool), policy);
/// let total = engine.run(&work).await?;
/// ```
pub struct TransactionRetry<R> {
    runner: R,
    policy: RetryPolicy,
    sleeper: Arc<dyn RetrySleeper>,
}

impl<R> TransactionRetry<R>
where
    R: TransactionRunner,
{
    /// Build an engine that backs off on the Tokio timer.
    pub fn new(runner: R, policy: RetryPolicy) -> Self {
        Self {
            runner,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the backoff sleeper.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn RetrySleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Policy applied to every call.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Underlying transactional resource.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `work` once with the policy's transaction options.
    pub async fn execute<W>(&self, work: &W) -> DomainResult<W::Output>
    where
        W: UnitOfWork<R::Connection> + ?Sized,
    {
        execute_transaction(&self.runner, work, &self.policy.transaction).await
    }

    /// Run `work` with retries according to the policy.
    pub async fn run<W>(&self, work: &W) -> DomainResult<W::Output>
    where
        W: UnitOfWork<R::Connection> + ?Sized,
    {
        retry_transaction_with_sleeper(&self.runner, work, &self.policy, self.sleeper.as_ref())
            .await
    }
}
