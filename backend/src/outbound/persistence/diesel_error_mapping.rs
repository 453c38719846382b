//! Diesel and pool error mapping into the domain taxonomy.
//!
//! Transient database conditions carry a backend condition code so the retry
//! engine can classify them without parsing driver messages.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::transaction_retry::{
    STATEMENT_TIMEOUT_CODE, TRANSACTION_CONFLICT_CODE, UNRESOLVED_RELATION_CODE,
};
use crate::domain::{Caught, DomainError};

/// Map a Diesel error into the taxonomy.
///
/// - Serialization failures become retryable database errors.
/// - `NotFound` inside a unit of work becomes a database error carrying the
///   unresolved-relation code.
/// - Closed connections become connection errors.
/// - Unique violations become duplicate-entry errors.
pub fn map_diesel_error(error: DieselError) -> DomainError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => {
            DomainError::database_with_code("record not found", UNRESOLVED_RELATION_CODE)
        }
        DieselError::QueryBuilderError(_) => DomainError::database("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            DomainError::database_with_code(info.message(), TRANSACTION_CONFLICT_CODE)
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => DomainError::connection("database connection error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let resource = info.table_name().unwrap_or("record").to_owned();
            let field = info
                .column_name()
                .or_else(|| info.constraint_name())
                .unwrap_or("unique key")
                .to_owned();
            DomainError::duplicate_entry(resource, field)
        }
        DieselError::DatabaseError(_, info) => DomainError::database(info.message()),
        other => DomainError::database(other.to_string()),
    }
}

/// Map a pool error into the taxonomy.
///
/// Checkout timeouts carry the statement-timeout code and are retryable.
pub fn map_pool_error(error: PoolError) -> DomainError {
    debug!(%error, "connection pool operation failed");
    match error {
        PoolError::Timeout { .. } => {
            DomainError::connection_with_code(error.to_string(), STATEMENT_TIMEOUT_CODE)
        }
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DomainError::connection(message)
        }
    }
}

impl From<DieselError> for Caught {
    fn from(value: DieselError) -> Self {
        Self::Domain(map_diesel_error(value))
    }
}

impl From<PoolError> for Caught {
    fn from(value: PoolError) -> Self {
        Self::Domain(map_pool_error(value))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{ErrorCode, is_retryable_error};
    use crate::test_support::capture_json_logs;
    use rstest::rstest;

    #[derive(Debug)]
    struct Info {
        message: &'static str,
        table: Option<&'static str>,
        column: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl Info {
        fn message(message: &'static str) -> Self {
            Self {
                message,
                table: None,
                column: None,
                constraint: None,
            }
        }
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            self.table
        }

        fn column_name(&self) -> Option<&str> {
            self.column
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, info: Info) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[rstest]
    fn non_database_failures_log_their_description() {
        let lines = capture_json_logs(|| {
            let _ = map_diesel_error(DieselError::NotFound);
        });
        let line = lines.first().expect("one log line");
        assert_eq!(line["level"], "DEBUG");
        assert_eq!(line["fields"]["error"], DieselError::NotFound.to_string());
    }

    #[rstest]
    fn serialization_failures_are_retryable_conflicts() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::SerializationFailure,
            Info::message("could not serialize access due to read/write dependencies"),
        ));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.backend_code(), Some(TRANSACTION_CONFLICT_CODE));
        assert!(is_retryable_error(&err));
    }

    #[rstest]
    fn not_found_carries_unresolved_relation_code() {
        let err = map_diesel_error(DieselError::NotFound);
        assert_eq!(err.backend_code(), Some(UNRESOLVED_RELATION_CODE));
    }

    #[rstest]
    fn closed_connections_become_connection_errors() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::ClosedConnection,
            Info::message("server closed the connection unexpectedly"),
        ));
        assert_eq!(err.code(), ErrorCode::ConnectionError);
        assert_eq!(err.status_code(), 503);
    }

    #[rstest]
    fn unique_violations_name_table_and_column() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            Info {
                message: "duplicate key value violates unique constraint",
                table: Some("users"),
                column: None,
                constraint: Some("users_email_key"),
            },
        ));
        assert_eq!(err.code(), ErrorCode::DuplicateEntry);
        assert_eq!(err.message(), "users with this users_email_key already exists");
    }

    #[rstest]
    fn other_database_errors_keep_driver_message() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::CheckViolation,
            Info::message("new row violates check constraint"),
        ));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.message(), "new row violates check constraint");
        assert!(!is_retryable_error(&err));
    }

    #[rstest]
    fn pool_timeouts_are_retryable_connection_errors() {
        let err = map_pool_error(PoolError::Timeout {
            waited: Duration::from_secs(1),
        });
        assert_eq!(err.code(), ErrorCode::ConnectionError);
        assert_eq!(err.backend_code(), Some(STATEMENT_TIMEOUT_CODE));
        assert!(is_retryable_error(&err));
    }

    #[rstest]
    fn pool_checkout_failures_keep_their_message() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(err.code(), ErrorCode::ConnectionError);
        assert_eq!(err.message(), "connection refused");
        assert_eq!(err.backend_code(), None);
    }

    #[rstest]
    fn diesel_errors_convert_into_classified_failures() {
        let caught = Caught::from(DieselError::NotFound);
        assert!(caught.as_domain().is_some());
    }
}
