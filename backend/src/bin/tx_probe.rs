//! Run a probe transaction through the retry engine against PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};

use clap::Parser;
use diesel::sql_types::Integer;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use faultline::config::RetrySettings;
use faultline::domain::ports::unit_of_work;
use faultline::domain::{Caught, DomainResultExt, TransactionRetry};
use faultline::inbound::http::create_error_response;
use faultline::outbound::persistence::{DbPool, DieselTransactionRunner, PoolConfig};
use futures_util::FutureExt;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `tx-probe` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tx-probe",
    about = "Run a probe transaction with retry settings from TX_RETRY_* variables",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Maximum number of pooled connections.
    #[arg(long = "pool-size", value_name = "count", default_value_t = 2)]
    pool_size: u32,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| io::Error::other(format!("install tracing subscriber: {error}")))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let program = env::args_os()
        .next()
        .unwrap_or_else(|| OsString::from("tx-probe"));
    let settings = RetrySettings::load_from_iter([program])
        .map_err(|error| io::Error::other(format!("load retry settings: {error}")))?;
    let policy = settings
        .to_policy()
        .map_err(|error| io::Error::other(format!("invalid retry settings: {error}")))?;

    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(args.pool_size))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let engine = TransactionRetry::new(DieselTransactionRunner::new(pool), policy);

    let probe = unit_of_work(|conn: &mut AsyncPgConnection| {
        async move {
            let value: i32 = diesel::select(diesel::dsl::sql::<Integer>("1"))
                .get_result(conn)
                .await?;
            Ok::<_, Caught>(value)
        }
        .boxed()
    });

    match engine.run(&probe).await.log_on_err(None) {
        Ok(value) => {
            info!(value, "probe transaction committed");
            writeln!(io::stdout().lock(), "ok value={value}")
        }
        Err(error) => {
            let body = serde_json::to_string(&create_error_response(&error, true))
                .map_err(io::Error::other)?;
            writeln!(io::stdout().lock(), "{body}")?;
            Err(io::Error::other(format!("probe transaction failed: {error}")))
        }
    }
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
