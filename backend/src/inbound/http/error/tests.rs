//! Tests for HTTP error mapping.

use super::*;
use crate::domain::ValidationDetail;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn invalid_signup() -> DomainError {
    DomainError::validation(vec![
        ValidationDetail::new("email", "is required"),
        ValidationDetail::new("age", "must be at least 18").with_value(json!(16)),
    ])
}

async fn response_json(error: &DomainError, expected_status: StatusCode) -> Value {
    let response = ResponseError::error_response(error);
    assert_eq!(response.status(), expected_status);

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
}

#[rstest]
#[case(DomainError::invalid_token("bad signature"), StatusCode::UNAUTHORIZED)]
#[case(DomainError::role_violation("sellers only"), StatusCode::FORBIDDEN)]
#[case(DomainError::not_found("Order"), StatusCode::NOT_FOUND)]
#[case(DomainError::limit_exceeded("cart full"), StatusCode::CONFLICT)]
#[case(DomainError::rate_limit_exceeded("slow down"), StatusCode::TOO_MANY_REQUESTS)]
#[case(DomainError::external_service("mailer", "down"), StatusCode::BAD_GATEWAY)]
#[case(DomainError::timeout("slow"), StatusCode::GATEWAY_TIMEOUT)]
fn status_code_matches_error_kind(#[case] error: DomainError, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
fn details_are_included_only_on_request(invalid_signup: DomainError) {
    let without = create_error_response(&invalid_signup, false);
    assert!(without.error.details.is_none());

    let with = create_error_response(&invalid_signup, true);
    let details = with.error.details.expect("details requested");
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].field(), "email");
}

#[rstest]
fn non_validation_errors_never_carry_details() {
    let response = create_error_response(&DomainError::conflict("stale"), true);
    assert!(response.error.details.is_none());
}

#[rstest]
fn envelope_serialises_in_camel_case(invalid_signup: DomainError) {
    insta::assert_json_snapshot!(create_error_response(&invalid_signup, true), @r#"
    {
      "error": {
        "code": "VALIDATION_ERROR",
        "message": "email: is required, age: must be at least 18",
        "statusCode": 400,
        "details": [
          {
            "field": "email",
            "message": "is required"
          },
          {
            "field": "age",
            "message": "must be at least 18",
            "value": 16
          }
        ]
      }
    }
    "#);
}

#[rstest]
#[actix_web::test]
async fn operational_errors_keep_their_message() {
    let body = response_json(&DomainError::forbidden("admins only"), StatusCode::FORBIDDEN).await;
    assert_eq!(
        body,
        json!({"error": {"code": "FORBIDDEN", "message": "admins only", "statusCode": 403}})
    );
}

#[rstest]
#[actix_web::test]
async fn validation_responses_omit_details(invalid_signup: DomainError) {
    let body = response_json(&invalid_signup, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].get("details").is_none());
}

#[rstest]
#[case(
    DomainError::database("relation \"users\" does not exist"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Database error"
)]
#[case(
    DomainError::connection("password authentication failed for user admin"),
    StatusCode::SERVICE_UNAVAILABLE,
    "Service temporarily unavailable"
)]
#[case(
    crate::domain::to_base_error("secret stack detail"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Internal server error"
)]
#[actix_web::test]
async fn systemic_messages_are_redacted(
    #[case] error: DomainError,
    #[case] status: StatusCode,
    #[case] expected: &str,
) {
    let body = response_json(&error, status).await;
    assert_eq!(body["error"]["message"], expected);
    assert_eq!(body["error"]["code"], error.code().as_str());
}

#[rstest]
#[actix_web::test]
async fn actix_errors_normalise_to_unknown_and_render_redacted() {
    let actix_err = actix_web::error::ErrorBadRequest("boom");
    let err: DomainError = actix_err.into();

    assert_eq!(err, crate::domain::to_base_error("boom"));
    assert_eq!(err.code(), ErrorCode::UnknownError);
    assert_eq!(err.message(), "boom");

    let body = response_json(&err, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(body["error"]["message"], "Internal server error");
}
