//! Port interface for running all-or-nothing units of work.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::domain::Caught;

/// Transaction isolation level requested from the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    /// Each statement sees data committed before it began.
    ReadCommitted,
    /// Every statement sees the snapshot taken at the first statement.
    RepeatableRead,
    /// Transactions behave as if executed one at a time.
    Serializable,
}

impl IsolationLevel {
    /// Canonical SQL spelling of the level.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Raised when an isolation level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown isolation level: {value}")]
pub struct IsolationLevelParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for IsolationLevel {
    type Err = IsolationLevelParseError;

    /// Accepts the SQL spelling as well as camel, snake or kebab case, in any
    /// letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalised.as_str() {
            "readcommitted" => Ok(Self::ReadCommitted),
            "repeatableread" => Ok(Self::RepeatableRead),
            "serializable" | "serialisable" => Ok(Self::Serializable),
            _ => Err(IsolationLevelParseError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Options passed unchanged to the transactional resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Requested isolation level; `None` keeps the resource default.
    pub isolation_level: Option<IsolationLevel>,
    /// Upper bound on the transaction's own execution time.
    pub timeout: Option<Duration>,
    /// Upper bound on waiting to acquire a connection.
    pub max_wait: Option<Duration>,
}

impl TransactionOptions {
    /// Request `level` isolation.
    #[must_use]
    pub const fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    /// Bound the transaction's execution time.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound the wait for a connection.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

/// Caller-supplied work executed inside one transaction.
///
/// The work may be invoked once per attempt, so it must be re-runnable.
#[async_trait]
pub trait UnitOfWork<C: Send>: Send + Sync {
    /// Value produced when the transaction commits.
    type Output: Send;

    /// Execute the work against the transaction's connection.
    async fn run(&self, connection: &mut C) -> Result<Self::Output, Caught>;
}

#[async_trait]
impl<C, T, F> UnitOfWork<C> for F
where
    C: Send,
    T: Send,
    F: for<'c> Fn(&'c mut C) -> BoxFuture<'c, Result<T, Caught>> + Send + Sync,
{
    type Output = T;

    async fn run(&self, connection: &mut C) -> Result<T, Caught> {
        self(connection).await
    }
}

/// Pin the closure signature so connection borrows infer correctly.
///
/// # Examples
/// ```
/// use faultline::domain::Caught;
/// use faultline::domain::ports::unit_of_work;
/// use futures_util::FutureExt;
///
/// let work = unit_of_work(|counter: &mut u32| {
///     async move {
///         *counter += 1;
///         Ok::<_, Caught>(*counter)
///     }
///     .boxed()
/// });
/// # let _ = work;
/// ```
pub fn unit_of_work<C, T, F>(f: F) -> F
where
    F: for<'c> Fn(&'c mut C) -> BoxFuture<'c, Result<T, Caught>> + Send + Sync,
{
    f
}

/// All-or-nothing transactional resource.
///
/// Implementations commit when the work succeeds and roll back otherwise;
/// options are honoured as given.
#[async_trait]
pub trait TransactionRunner: Send + Sync {
    /// Connection handed to units of work.
    type Connection: Send;

    /// Run `work` inside a single transaction.
    async fn run_transaction<W>(
        &self,
        work: &W,
        options: &TransactionOptions,
    ) -> Result<W::Output, Caught>
    where
        W: UnitOfWork<Self::Connection> + ?Sized;
}
