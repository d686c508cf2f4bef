use super::*;

#[test]
fn plain_json_is_success() {
    let v = normalize_reply("/health", 200, br#"{"success":true}"#).expect("ok");
    assert_eq!(v["success"], serde_json::Value::Bool(true));
}

#[test]
fn bare_array_is_success() {
    let v = normalize_reply("/draft/history", 200, b"[]").expect("ok");
    assert!(v.as_array().is_some_and(|a| a.is_empty()));
}

#[test]
fn success_false_is_application_failure_verbatim() {
    let err = normalize_reply("/draft/restore", 200, br#"{"success":false,"error":"Version not found"}"#)
        .expect_err("failure");
    assert!(err.is_application());
    assert_eq!(err.to_string(), "Version not found");
}

#[test]
fn success_false_without_message_gets_placeholder() {
    let err = normalize_reply("/draft/init", 200, br#"{"success":false}"#).expect_err("failure");
    assert_eq!(err.to_string(), "Unknown Error");
}

#[test]
fn error_status_with_parseable_body_uses_error_field() {
    let err = normalize_reply("/draft/commit", 409, br#"{"success":false,"error":"nothing to commit"}"#)
        .expect_err("failure");
    assert!(err.is_application());
    assert_eq!(err.to_string(), "nothing to commit");
}

#[test]
fn error_status_with_unparseable_body_reports_code() {
    let err = normalize_reply("/draft/commit", 502, b"<html>bad gateway</html>").expect_err("failure");
    assert!(err.is_application());
    assert_eq!(err.to_string(), "HTTP 502");
}

#[test]
fn malformed_success_body_is_transport_failure() {
    let err = normalize_reply("/auth/status", 200, b"not json").expect_err("failure");
    assert!(err.is_transport());
    assert!(err.to_string().starts_with("service unreachable"));
}
