//! Failures intercepted at a boundary before classification.
//!
//! A [`Caught`] value is whatever a unit of work produced instead of a
//! success: an already-classified [`DomainError`], an arbitrary error object,
//! or the payload of a panic. [`to_base_error`] is the single place that
//! turns these into the taxonomy.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use tracing::{debug, error};

use super::DomainError;

/// Message used when an intercepted failure carries no usable text.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred";

/// Anything intercepted at a boundary before classification.
pub enum Caught {
    /// An error that already belongs to the taxonomy.
    Domain(DomainError),
    /// A message-bearing failure from outside the taxonomy.
    Failure(Box<dyn StdError + Send + Sync + 'static>),
    /// The payload of an intercepted panic.
    Panic(Box<dyn Any + Send + 'static>),
}

impl Caught {
    /// Wrap any error object as an unclassified failure.
    pub fn failure<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failure(Box::new(error))
    }

    /// Wrap a payload recovered from `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self::Panic(payload)
    }

    /// The taxonomy error, when the failure is already classified.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Text carried by the failure, if any.
    ///
    /// Panic payloads expose their message when they were raised with a
    /// string; the text is used for logging only.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Domain(err) => Some(err.message().to_owned()),
            Self::Failure(err) => Some(err.to_string()),
            Self::Panic(payload) => panic_message(payload.as_ref()).map(str::to_owned),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

impl fmt::Debug for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(err) => f.debug_tuple("Domain").field(err).finish(),
            Self::Failure(err) => f.debug_tuple("Failure").field(err).finish(),
            Self::Panic(payload) => f
                .debug_tuple("Panic")
                .field(&panic_message(payload.as_ref()).unwrap_or("<opaque>"))
                .finish(),
        }
    }
}

impl From<DomainError> for Caught {
    fn from(value: DomainError) -> Self {
        Self::Domain(value)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Caught {
    fn from(value: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self::Failure(value)
    }
}

impl From<String> for Caught {
    fn from(value: String) -> Self {
        Self::Failure(value.into())
    }
}

impl From<&str> for Caught {
    fn from(value: &str) -> Self {
        Self::Failure(value.into())
    }
}

impl From<std::io::Error> for Caught {
    fn from(value: std::io::Error) -> Self {
        Self::failure(value)
    }
}

impl From<serde_json::Error> for Caught {
    fn from(value: serde_json::Error) -> Self {
        Self::failure(value)
    }
}

impl From<Caught> for DomainError {
    fn from(value: Caught) -> Self {
        to_base_error(value)
    }
}

/// Normalise an intercepted failure into the taxonomy.
///
/// Taxonomy errors pass through unchanged. Other failures become
/// [`ErrorCode::UnknownError`](super::ErrorCode::UnknownError) keeping their
/// message; panics and blank messages use [`UNEXPECTED_FAILURE_MESSAGE`].
/// Applying the function to its own output returns that output.
///
/// A returned `&str` or `String` converts into a boxed error object, so it
/// counts as a generic failure and keeps its text. The same string raised as
/// a panic payload does not: panics always get the fixed message.
///
/// # Examples
/// ```
/// use faultline::domain::{to_base_error, DomainError, ErrorCode};
///
/// let err = to_base_error("socket closed");
/// assert_eq!(err.code(), ErrorCode::UnknownError);
/// assert_eq!(err.message(), "socket closed");
///
/// let known = DomainError::conflict("stale");
/// assert_eq!(to_base_error(known.clone()), known);
/// ```
pub fn to_base_error(caught: impl Into<Caught>) -> DomainError {
    match caught.into() {
        Caught::Domain(err) => err,
        Caught::Failure(err) => {
            let message = err.to_string();
            debug!(error = %message, "unclassified failure normalised to unknown error");
            if message.trim().is_empty() {
                DomainError::unknown(UNEXPECTED_FAILURE_MESSAGE)
            } else {
                DomainError::unknown(message)
            }
        }
        Caught::Panic(payload) => {
            error!(
                panic_message = panic_message(payload.as_ref()).unwrap_or("<opaque>"),
                "panic intercepted at error boundary"
            );
            DomainError::unknown(UNEXPECTED_FAILURE_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn domain_errors_pass_through() {
        let err = DomainError::duplicate_entry("User", "email");
        assert_eq!(to_base_error(err.clone()), err);
    }

    #[rstest]
    #[case(Caught::from("connection reset"), "connection reset")]
    #[case(Caught::from(String::from("bad frame")), "bad frame")]
    #[case(
        Caught::from(std::io::Error::other("disk full")),
        "disk full"
    )]
    #[case(Caught::from(""), UNEXPECTED_FAILURE_MESSAGE)]
    fn failures_become_unknown_errors(#[case] caught: Caught, #[case] expected: &str) {
        let err = to_base_error(caught);
        assert_eq!(err.code(), ErrorCode::UnknownError);
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_operational());
        assert_eq!(err.message(), expected);
    }

    #[rstest]
    fn panic_payloads_use_fixed_message() {
        let caught = Caught::from_panic(Box::new(42_u8));
        let err = to_base_error(caught);
        assert_eq!(err.code(), ErrorCode::UnknownError);
        assert_eq!(err.message(), UNEXPECTED_FAILURE_MESSAGE);
    }

    #[rstest]
    fn panic_text_is_not_exposed_in_the_error() {
        let caught = Caught::from_panic(Box::new("secret internals"));
        assert_eq!(caught.message().as_deref(), Some("secret internals"));
        assert_eq!(to_base_error(caught).message(), UNEXPECTED_FAILURE_MESSAGE);
    }

    #[rstest]
    fn returned_strings_keep_text_but_panicked_strings_do_not() {
        let returned = to_base_error(Caught::from("ledger offline"));
        let panicked = to_base_error(Caught::from_panic(Box::new("ledger offline")));

        assert_eq!(returned.message(), "ledger offline");
        assert_eq!(panicked.message(), UNEXPECTED_FAILURE_MESSAGE);
        assert_eq!(returned.code(), panicked.code());
    }

    #[rstest]
    fn normalisation_is_idempotent() {
        let once = to_base_error("timeout talking to ledger");
        let twice = to_base_error(once.clone());
        assert_eq!(once, twice);
    }

    #[rstest]
    fn debug_output_names_the_variant() {
        let rendered = format!("{:?}", Caught::from_panic(Box::new(String::from("boom"))));
        assert_eq!(rendered, "Panic(\"boom\")");
    }
}
