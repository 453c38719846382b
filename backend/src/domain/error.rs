//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic. Every failure the backend surfaces is
//! one [`ErrorKind`] out of a closed set; the kind fixes the stable code, the
//! HTTP-style status classification and the operational flag, so call sites
//! only ever supply the human-readable message. Inbound adapters map these
//! errors to HTTP responses, log lines or any other protocol envelope.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Concern an error kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Authentication and authorisation failures.
    Auth,
    /// Field-level input violations.
    Validation,
    /// Business-rule violations of the served domain.
    Domain,
    /// Faults in databases, upstream services, uploads and throttling.
    Infrastructure,
    /// Failures intercepted without any structured classification.
    Systemic,
}

macro_rules! define_error_codes {
    (
        $(
            $(#[$variant_meta:meta])*
            $variant:ident => {
                code: $code:literal,
                name: $name:literal,
                status: $status:literal,
                operational: $operational:literal,
                category: $category:ident $(,)?
            }
        ),* $(,)?
    ) => {
        /// Stable machine-readable error code describing the failure kind.
        ///
        /// Each code carries a fixed status classification and operational
        /// flag. Codes serialise as their `SCREAMING_SNAKE_CASE` string.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl ErrorCode {
            /// Every code in the taxonomy, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Wire representation of the code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// Error type name reported alongside the code.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// HTTP-style status classification.
            pub const fn status_code(self) -> u16 {
                match self {
                    $(Self::$variant => $status,)*
                }
            }

            /// Whether errors with this code are expected business conditions.
            pub const fn is_operational(self) -> bool {
                match self {
                    $(Self::$variant => $operational,)*
                }
            }

            /// Concern the code belongs to.
            pub const fn category(self) -> ErrorCategory {
                match self {
                    $(Self::$variant => ErrorCategory::$category,)*
                }
            }
        }
    };
}

define_error_codes! {
    /// Authentication failed or is missing.
    AuthenticationError => {
        code: "AUTHENTICATION_ERROR",
        name: "AuthenticationError",
        status: 401,
        operational: true,
        category: Auth,
    },
    /// The caller is not authenticated for this resource.
    Unauthorized => {
        code: "UNAUTHORIZED",
        name: "UnauthorizedError",
        status: 401,
        operational: true,
        category: Auth,
    },
    /// Authenticated but not permitted to perform this action.
    Forbidden => {
        code: "FORBIDDEN",
        name: "ForbiddenError",
        status: 403,
        operational: true,
        category: Auth,
    },
    /// Supplied credentials do not match.
    InvalidCredentials => {
        code: "INVALID_CREDENTIALS",
        name: "InvalidCredentialsError",
        status: 401,
        operational: true,
        category: Auth,
    },
    /// The presented token has expired.
    TokenExpired => {
        code: "TOKEN_EXPIRED",
        name: "TokenExpiredError",
        status: 401,
        operational: true,
        category: Auth,
    },
    /// The presented token is malformed or forged.
    InvalidToken => {
        code: "INVALID_TOKEN",
        name: "InvalidTokenError",
        status: 401,
        operational: true,
        category: Auth,
    },
    /// The caller lacks a required permission.
    InsufficientPermissions => {
        code: "INSUFFICIENT_PERMISSIONS",
        name: "InsufficientPermissionsError",
        status: 403,
        operational: true,
        category: Auth,
    },
    /// The account has been deactivated.
    AccountInactive => {
        code: "ACCOUNT_INACTIVE",
        name: "AccountInactiveError",
        status: 403,
        operational: true,
        category: Auth,
    },
    /// The account email address has not been verified.
    EmailNotVerified => {
        code: "EMAIL_NOT_VERIFIED",
        name: "EmailNotVerifiedError",
        status: 403,
        operational: true,
        category: Auth,
    },
    /// One or more input fields failed validation.
    ValidationError => {
        code: "VALIDATION_ERROR",
        name: "ValidationError",
        status: 400,
        operational: true,
        category: Validation,
    },
    /// The requested resource does not exist.
    NotFound => {
        code: "NOT_FOUND",
        name: "NotFoundError",
        status: 404,
        operational: true,
        category: Domain,
    },
    /// The request conflicts with the current resource state.
    Conflict => {
        code: "CONFLICT",
        name: "ConflictError",
        status: 409,
        operational: true,
        category: Domain,
    },
    /// A unique key is already taken.
    DuplicateEntry => {
        code: "DUPLICATE_ENTRY",
        name: "DuplicateEntryError",
        status: 409,
        operational: true,
        category: Domain,
    },
    /// A business rule rejected the operation.
    BusinessRuleViolation => {
        code: "BUSINESS_RULE_VIOLATION",
        name: "BusinessRuleError",
        status: 400,
        operational: true,
        category: Domain,
    },
    /// Not enough stock or balance to fulfil the request.
    InsufficientQuantity => {
        code: "INSUFFICIENT_QUANTITY",
        name: "InsufficientQuantityError",
        status: 400,
        operational: true,
        category: Domain,
    },
    /// The caller's role does not allow the operation.
    RoleViolation => {
        code: "ROLE_VIOLATION",
        name: "RoleViolationError",
        status: 403,
        operational: true,
        category: Domain,
    },
    /// A configured domain limit has been reached.
    LimitExceeded => {
        code: "LIMIT_EXCEEDED",
        name: "LimitExceededError",
        status: 409,
        operational: true,
        category: Domain,
    },
    /// The database rejected or failed an operation.
    DatabaseError => {
        code: "DATABASE_ERROR",
        name: "DatabaseError",
        status: 500,
        operational: false,
        category: Infrastructure,
    },
    /// A connection to a backing service could not be established.
    ConnectionError => {
        code: "CONNECTION_ERROR",
        name: "ConnectionError",
        status: 503,
        operational: false,
        category: Infrastructure,
    },
    /// An upstream service returned a failure.
    ExternalServiceError => {
        code: "EXTERNAL_SERVICE_ERROR",
        name: "ExternalServiceError",
        status: 502,
        operational: false,
        category: Infrastructure,
    },
    /// An uploaded file could not be accepted.
    FileUploadError => {
        code: "FILE_UPLOAD_ERROR",
        name: "FileUploadError",
        status: 400,
        operational: true,
        category: Infrastructure,
    },
    /// An uploaded file exceeds the size limit.
    FileTooLarge => {
        code: "FILE_TOO_LARGE",
        name: "FileTooLargeError",
        status: 400,
        operational: true,
        category: Infrastructure,
    },
    /// An uploaded file has a disallowed type.
    InvalidFileType => {
        code: "INVALID_FILE_TYPE",
        name: "InvalidFileTypeError",
        status: 400,
        operational: true,
        category: Infrastructure,
    },
    /// The caller exceeded the request rate limit.
    RateLimitExceeded => {
        code: "RATE_LIMIT_EXCEEDED",
        name: "RateLimitError",
        status: 429,
        operational: true,
        category: Infrastructure,
    },
    /// A dependency is temporarily unavailable.
    ServiceUnavailable => {
        code: "SERVICE_UNAVAILABLE",
        name: "ServiceUnavailableError",
        status: 503,
        operational: false,
        category: Infrastructure,
    },
    /// An operation did not complete in time.
    Timeout => {
        code: "TIMEOUT",
        name: "TimeoutError",
        status: 504,
        operational: false,
        category: Infrastructure,
    },
    /// An unclassified failure intercepted at a boundary.
    UnknownError => {
        code: "UNKNOWN_ERROR",
        name: "UnknownError",
        status: 500,
        operational: false,
        category: Systemic,
    },
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Field name used when a validation message is not tied to a specific field.
pub const GENERAL_FIELD: &str = "general";

/// One field-level validation violation.
///
/// # Examples
/// ```
/// use faultline::domain::ValidationDetail;
/// use serde_json::json;
///
/// let detail = ValidationDetail::new("quantity", "must be positive").with_value(json!(-2));
/// assert_eq!(detail.field(), "quantity");
/// assert_eq!(detail.value(), Some(&json!(-2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetail {
    field: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl ValidationDetail {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Attach the offending input value.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Name of the violating field.
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Description of the violation.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Offending input value, when recorded.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// Closed set of failure kinds with their kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`ErrorCode::AuthenticationError`].
    Authentication,
    /// See [`ErrorCode::Unauthorized`].
    Unauthorized,
    /// See [`ErrorCode::Forbidden`].
    Forbidden,
    /// See [`ErrorCode::InvalidCredentials`].
    InvalidCredentials,
    /// See [`ErrorCode::TokenExpired`].
    TokenExpired,
    /// See [`ErrorCode::InvalidToken`].
    InvalidToken,
    /// See [`ErrorCode::InsufficientPermissions`].
    InsufficientPermissions,
    /// See [`ErrorCode::AccountInactive`].
    AccountInactive,
    /// See [`ErrorCode::EmailNotVerified`].
    EmailNotVerified,
    /// Field-level violations.
    Validation {
        /// Violations in the order they were reported.
        errors: Vec<ValidationDetail>,
    },
    /// A missing resource.
    NotFound {
        /// Resource type name.
        resource: String,
        /// Identifier that was looked up, if any.
        id: Option<String>,
    },
    /// See [`ErrorCode::Conflict`].
    Conflict,
    /// A unique key collision.
    DuplicateEntry {
        /// Resource type name.
        resource: String,
        /// Field carrying the unique constraint.
        field: String,
    },
    /// See [`ErrorCode::BusinessRuleViolation`].
    BusinessRule,
    /// See [`ErrorCode::InsufficientQuantity`].
    InsufficientQuantity,
    /// See [`ErrorCode::RoleViolation`].
    RoleViolation,
    /// See [`ErrorCode::LimitExceeded`].
    LimitExceeded,
    /// A database fault.
    Database {
        /// Driver-level condition code, used for retry classification.
        backend_code: Option<String>,
    },
    /// A connection fault.
    Connection {
        /// Driver-level condition code, used for retry classification.
        backend_code: Option<String>,
    },
    /// An upstream service fault.
    ExternalService {
        /// Name of the failing service.
        service: String,
    },
    /// See [`ErrorCode::FileUploadError`].
    FileUpload,
    /// An oversized upload.
    FileTooLarge {
        /// Maximum accepted size in bytes.
        max_bytes: u64,
    },
    /// An upload with a disallowed type.
    InvalidFileType {
        /// Accepted media types.
        allowed: Vec<String>,
    },
    /// See [`ErrorCode::RateLimitExceeded`].
    RateLimitExceeded,
    /// See [`ErrorCode::ServiceUnavailable`].
    ServiceUnavailable,
    /// See [`ErrorCode::Timeout`].
    Timeout,
    /// See [`ErrorCode::UnknownError`].
    Unknown,
}

impl ErrorKind {
    /// Stable code fixed for this kind.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication => ErrorCode::AuthenticationError,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Forbidden => ErrorCode::Forbidden,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::TokenExpired => ErrorCode::TokenExpired,
            Self::InvalidToken => ErrorCode::InvalidToken,
            Self::InsufficientPermissions => ErrorCode::InsufficientPermissions,
            Self::AccountInactive => ErrorCode::AccountInactive,
            Self::EmailNotVerified => ErrorCode::EmailNotVerified,
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict => ErrorCode::Conflict,
            Self::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            Self::BusinessRule => ErrorCode::BusinessRuleViolation,
            Self::InsufficientQuantity => ErrorCode::InsufficientQuantity,
            Self::RoleViolation => ErrorCode::RoleViolation,
            Self::LimitExceeded => ErrorCode::LimitExceeded,
            Self::Database { .. } => ErrorCode::DatabaseError,
            Self::Connection { .. } => ErrorCode::ConnectionError,
            Self::ExternalService { .. } => ErrorCode::ExternalServiceError,
            Self::FileUpload => ErrorCode::FileUploadError,
            Self::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            Self::InvalidFileType { .. } => ErrorCode::InvalidFileType,
            Self::RateLimitExceeded => ErrorCode::RateLimitExceeded,
            Self::ServiceUnavailable => ErrorCode::ServiceUnavailable,
            Self::Timeout => ErrorCode::Timeout,
            Self::Unknown => ErrorCode::UnknownError,
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `code`, `status_code` and `is_operational` are fixed by the kind.
/// - Fields are private; an error is immutable once constructed.
/// - Equality compares kind and message only; the captured stack is ignored.
///
/// # Examples
/// ```
/// use faultline::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::not_found_with_id("Product", 42);
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.status_code(), 404);
/// assert_eq!(err.message(), "Product with id 42 not found");
/// assert!(err.is_operational());
/// ```
#[derive(Clone)]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    backtrace: Arc<Backtrace>,
}

impl DomainError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    /// Kind of the failure with its payload.
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP-style status classification.
    pub const fn status_code(&self) -> u16 {
        self.code().status_code()
    }

    /// Whether the error is an expected business condition.
    pub const fn is_operational(&self) -> bool {
        self.code().is_operational()
    }

    /// Concern the error belongs to.
    pub const fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Validation violations carried by the error, if it is a validation error.
    pub fn validation_errors(&self) -> Option<&[ValidationDetail]> {
        match &self.kind {
            ErrorKind::Validation { errors } => Some(errors.as_slice()),
            _ => None,
        }
    }

    /// Driver-level condition code attached by a database adapter.
    pub fn backend_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Database { backend_code } | ErrorKind::Connection { backend_code } => {
                backend_code.as_deref()
            }
            _ => None,
        }
    }

    /// Stack captured at construction, when backtraces are enabled via
    /// `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`.
    pub fn stack(&self) -> Option<String> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(self.backtrace.to_string()),
            _ => None,
        }
    }

    /// Plain record used to transport the error.
    pub fn to_record(&self) -> ErrorRecord<'_> {
        ErrorRecord {
            name: self.code().name(),
            message: self.message(),
            code: self.code(),
            status_code: self.status_code(),
            errors: self.validation_errors(),
        }
    }

    /// Convenience constructor for [`ErrorCode::AuthenticationError`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredentials`].
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Convenience constructor for [`ErrorCode::TokenExpired`].
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidToken`].
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Convenience constructor for [`ErrorCode::InsufficientPermissions`].
    pub fn insufficient_permissions(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPermissions, message)
    }

    /// Convenience constructor for [`ErrorCode::AccountInactive`].
    pub fn account_inactive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountInactive, message)
    }

    /// Convenience constructor for [`ErrorCode::EmailNotVerified`].
    pub fn email_not_verified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmailNotVerified, message)
    }

    /// Validation error built from field-level violations.
    ///
    /// The message joins every `field: message` pair with `", "`. An empty
    /// list yields the message `"Validation failed"`.
    ///
    /// # Examples
    /// ```
    /// use faultline::domain::{DomainError, ValidationDetail};
    ///
    /// let err = DomainError::validation(vec![
    ///     ValidationDetail::new("email", "is required"),
    ///     ValidationDetail::new("age", "must be at least 18"),
    /// ]);
    /// assert_eq!(err.message(), "email: is required, age: must be at least 18");
    /// ```
    pub fn validation(errors: Vec<ValidationDetail>) -> Self {
        let message = if errors.is_empty() {
            "Validation failed".to_owned()
        } else {
            errors
                .iter()
                .map(|detail| format!("{}: {}", detail.field, detail.message))
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self::new(ErrorKind::Validation { errors }, message)
    }

    /// Validation error from a message that is not tied to a field.
    ///
    /// The single violation is recorded against [`GENERAL_FIELD`].
    pub fn validation_message(message: impl Into<String>) -> Self {
        Self::validation(vec![ValidationDetail::new(GENERAL_FIELD, message)])
    }

    /// Missing resource without a known identifier.
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        let message = format!("{resource} not found");
        Self::new(ErrorKind::NotFound { resource, id: None }, message)
    }

    /// Missing resource looked up by identifier.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl fmt::Display) -> Self {
        let resource = resource.into();
        let id = id.to_string();
        let message = format!("{resource} with id {id} not found");
        Self::new(
            ErrorKind::NotFound {
                resource,
                id: Some(id),
            },
            message,
        )
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Unique key collision on `field` of `resource`.
    pub fn duplicate_entry(resource: impl Into<String>, field: impl Into<String>) -> Self {
        let resource = resource.into();
        let field = field.into();
        let message = format!("{resource} with this {field} already exists");
        Self::new(ErrorKind::DuplicateEntry { resource, field }, message)
    }

    /// Convenience constructor for [`ErrorCode::BusinessRuleViolation`].
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BusinessRule, message)
    }

    /// Convenience constructor for [`ErrorCode::InsufficientQuantity`].
    pub fn insufficient_quantity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientQuantity, message)
    }

    /// Convenience constructor for [`ErrorCode::RoleViolation`].
    pub fn role_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RoleViolation, message)
    }

    /// Convenience constructor for [`ErrorCode::LimitExceeded`].
    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LimitExceeded, message)
    }

    /// Convenience constructor for [`ErrorCode::DatabaseError`].
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database { backend_code: None }, message)
    }

    /// Database fault carrying a driver-level condition code.
    ///
    /// # Examples
    /// ```
    /// use faultline::domain::DomainError;
    ///
    /// let err = DomainError::database_with_code("write conflict", "P2034");
    /// assert_eq!(err.backend_code(), Some("P2034"));
    /// assert!(!err.is_operational());
    /// ```
    pub fn database_with_code(message: impl Into<String>, backend_code: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Database {
                backend_code: Some(backend_code.into()),
            },
            message,
        )
    }

    /// Convenience constructor for [`ErrorCode::ConnectionError`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection { backend_code: None }, message)
    }

    /// Connection fault carrying a driver-level condition code.
    pub fn connection_with_code(
        message: impl Into<String>,
        backend_code: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Connection {
                backend_code: Some(backend_code.into()),
            },
            message,
        )
    }

    /// Failure reported by the upstream `service`.
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        let service = service.into();
        let message = format!("{service}: {}", message.into());
        Self::new(ErrorKind::ExternalService { service }, message)
    }

    /// Convenience constructor for [`ErrorCode::FileUploadError`].
    pub fn file_upload(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileUpload, message)
    }

    /// Upload rejected for exceeding `max_bytes`.
    pub fn file_too_large(max_bytes: u64) -> Self {
        Self::new(
            ErrorKind::FileTooLarge { max_bytes },
            format!("File size exceeds the maximum of {max_bytes} bytes"),
        )
    }

    /// Upload rejected because its type is not one of `allowed`.
    pub fn invalid_file_type<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        let message = format!("Invalid file type. Allowed types: {}", allowed.join(", "));
        Self::new(ErrorKind::InvalidFileType { allowed }, message)
    }

    /// Convenience constructor for [`ErrorCode::RateLimitExceeded`].
    pub fn rate_limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimitExceeded, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Unclassified failure. Only [`to_base_error`](super::to_base_error)
    /// builds these from intercepted input.
    pub(crate) fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl PartialEq for DomainError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl Eq for DomainError {}

impl fmt::Debug for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainError")
            .field("code", &self.code())
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}

impl Serialize for DomainError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Transport record for a [`DomainError`].
///
/// Serialises as `{name, message, code, statusCode}` plus `errors` for
/// validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord<'a> {
    /// Error type name.
    pub name: &'static str,
    /// Human-readable message.
    pub message: &'a str,
    /// Stable error code.
    pub code: ErrorCode,
    /// HTTP-style status classification.
    pub status_code: u16,
    /// Validation violations, present only for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [ValidationDetail]>,
}
