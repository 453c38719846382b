//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the transactional resource behind the retry engine, backed by
//! `diesel-async` connections from a `bb8` pool, and the mapping of driver
//! errors into the domain taxonomy.
//!
//! # Example
//!
//! ```ignore
//! use faultline::outbound::persistence::{DbPool, DieselTransactionRunner, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/mydb");
//! let pool = DbPool::new(config).await?;
//! let runner = DieselTransactionRunner::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_transaction_runner;
mod pool;

pub use diesel_error_mapping::{map_diesel_error, map_pool_error};
pub use diesel_transaction_runner::DieselTransactionRunner;
pub use pool::{DbPool, PoolConfig, PoolError};
