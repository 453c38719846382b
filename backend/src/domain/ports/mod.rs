//! Domain ports and supporting types for the hexagonal boundary.

mod transaction_runner;

pub use transaction_runner::{
    IsolationLevel, IsolationLevelParseError, TransactionOptions, TransactionRunner, UnitOfWork,
    unit_of_work,
};
