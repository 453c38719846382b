//! Error taxonomy, Result propagation and transactional retry for backend
//! services.
//!
//! - [`domain`] holds the closed error taxonomy, the combinators that keep
//!   failures as values, and the retry engine.
//! - [`inbound`] renders domain errors for HTTP callers.
//! - [`outbound`] provides the PostgreSQL transactional resource.
//! - [`config`] loads and validates retry settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
