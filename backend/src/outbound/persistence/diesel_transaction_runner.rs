//! PostgreSQL-backed transactional resource.

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use super::pool::DbPool;
use crate::domain::Caught;
use crate::domain::ports::{IsolationLevel, TransactionOptions, TransactionRunner, UnitOfWork};

/// Runs units of work inside PostgreSQL transactions from a [`DbPool`].
///
/// Checkout honours `max_wait`, the isolation level is set when the
/// transaction begins and `timeout` becomes a transaction-local
/// `statement_timeout`.
#[derive(Clone)]
pub struct DieselTransactionRunner {
    pool: DbPool,
}

impl DieselTransactionRunner {
    /// Create a runner with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRunner for DieselTransactionRunner {
    type Connection = AsyncPgConnection;

    async fn run_transaction<W>(
        &self,
        work: &W,
        options: &TransactionOptions,
    ) -> Result<W::Output, Caught>
    where
        W: UnitOfWork<Self::Connection> + ?Sized,
    {
        let mut conn = self.pool.get_within(options.max_wait).await?;
        let statement_timeout_ms = options.timeout.map(|timeout| timeout.as_millis());
        debug!(
            isolation_level = options.isolation_level.map(IsolationLevel::as_sql),
            statement_timeout_ms = statement_timeout_ms.map(|ms| ms.to_string()),
            "opening transaction"
        );

        let builder = conn.build_transaction();
        let mut builder = match options.isolation_level {
            Some(IsolationLevel::ReadCommitted) => builder.read_committed(),
            Some(IsolationLevel::RepeatableRead) => builder.repeatable_read(),
            Some(IsolationLevel::Serializable) => builder.serializable(),
            None => builder,
        };

        builder
            .run(|conn| {
                async move {
                    if let Some(ms) = statement_timeout_ms {
                        diesel::sql_query(format!("SET LOCAL statement_timeout = {ms}"))
                            .execute(conn)
                            .await?;
                    }
                    work.run(conn).await
                }
                .scope_boxed()
            })
            .await
    }
}
