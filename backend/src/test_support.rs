//! Test utilities for the faultline crate.
//!
//! This module provides shared doubles for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::ports::{TransactionOptions, TransactionRunner, UnitOfWork};
use crate::domain::{Caught, DomainError, RetrySleeper};

/// Message returned once a [`ScriptedUnitOfWork`] runs out of outcomes.
pub const SCRIPT_EXHAUSTED_MESSAGE: &str = "unit of work script exhausted";

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// In-memory sink for JSON-formatted tracing output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Parsed log lines written so far.
    ///
    /// # Panics
    ///
    /// Panics when a captured line is not valid JSON.
    pub fn lines(&self) -> Vec<Value> {
        let buffer = lock(&self.0, "log buffer");
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(|line| match serde_json::from_str(line) {
                Ok(value) => value,
                Err(err) => panic!("captured log line is not JSON: {err}"),
            })
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0, "log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` under a JSON subscriber at `TRACE` and return the events it logged.
pub fn capture_json_logs(f: impl FnOnce()) -> Vec<Value> {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.lines()
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0, "sleeper").clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0, "sleeper").push(duration);
    }
}

/// Connection handed out by [`ScriptedTransactionRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedConnection {
    /// Zero-based index of the transaction this connection serves.
    pub transaction: usize,
}

/// Unit of work replaying a fixed script of outcomes, one per run.
///
/// Once the script is exhausted every run returns the fallback error, or a
/// plain failure carrying [`SCRIPT_EXHAUSTED_MESSAGE`] when none is set.
pub struct ScriptedUnitOfWork<T> {
    outcomes: Mutex<VecDeque<Result<T, DomainError>>>,
    fallback: Option<DomainError>,
    calls: AtomicUsize,
}

impl<T> ScriptedUnitOfWork<T> {
    /// Replay `outcomes` in order.
    pub fn new(outcomes: impl IntoIterator<Item = Result<T, DomainError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail `failures` times with `error`, then succeed with `value`.
    pub fn failing_then(failures: usize, error: &DomainError, value: T) -> Self {
        let outcomes = std::iter::repeat_with(|| Err(error.clone()))
            .take(failures)
            .chain(std::iter::once(Ok(value)));
        Self::new(outcomes)
    }

    /// Fail with `error` on every run.
    pub fn always_failing(error: DomainError) -> Self {
        Self::new(Vec::new()).with_fallback(error)
    }

    /// Error returned once the script is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, error: DomainError) -> Self {
        self.fallback = Some(error);
        self
    }

    /// Number of times the unit of work ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C, T> UnitOfWork<C> for ScriptedUnitOfWork<T>
where
    C: Send,
    T: Send,
{
    type Output = T;

    async fn run(&self, _connection: &mut C) -> Result<T, Caught> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.outcomes, "script").pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err.into()),
            None => Err(self
                .fallback
                .clone()
                .map_or_else(|| Caught::from(SCRIPT_EXHAUSTED_MESSAGE), Caught::from)),
        }
    }
}

/// In-memory transactional resource that counts commits and rollbacks.
#[derive(Debug, Default)]
pub struct ScriptedTransactionRunner {
    transactions: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    options: Mutex<Vec<TransactionOptions>>,
}

impl ScriptedTransactionRunner {
    /// Transactions opened so far.
    pub fn transactions(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Transactions committed so far.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Transactions rolled back so far.
    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Options received by each transaction, in order.
    pub fn recorded_options(&self) -> Vec<TransactionOptions> {
        lock(&self.options, "options").clone()
    }
}

#[async_trait]
impl TransactionRunner for ScriptedTransactionRunner {
    type Connection = ScriptedConnection;

    async fn run_transaction<W>(
        &self,
        work: &W,
        options: &TransactionOptions,
    ) -> Result<W::Output, Caught>
    where
        W: UnitOfWork<Self::Connection> + ?Sized,
    {
        let transaction = self.transactions.fetch_add(1, Ordering::SeqCst);
        lock(&self.options, "options").push(*options);
        let mut connection = ScriptedConnection { transaction };
        let result = work.run(&mut connection).await;
        let counter = if result.is_ok() {
            &self.commits
        } else {
            &self.rollbacks
        };
        counter.fetch_add(1, Ordering::SeqCst);
        result
    }
}
