use super::*;

#[test]
fn server_errors_are_transient() {
    assert_eq!(classify(&ureq::Error::StatusCode(500)), Retry::Transient);
    assert_eq!(classify(&ureq::Error::StatusCode(503)), Retry::Transient);
    assert_eq!(classify(&ureq::Error::StatusCode(429)), Retry::Transient);
    assert_eq!(classify(&ureq::Error::ConnectionFailed), Retry::Transient);
    assert_eq!(classify(&ureq::Error::HostNotFound), Retry::Transient);
}

#[test]
fn client_errors_are_fatal() {
    assert_eq!(classify(&ureq::Error::StatusCode(400)), Retry::Fatal);
    assert_eq!(classify(&ureq::Error::StatusCode(401)), Retry::Fatal);
    assert_eq!(classify(&ureq::Error::StatusCode(404)), Retry::Fatal);
}

#[test]
fn fatal_error_stops_immediately() {
    let mut calls = 0;
    let result = send_with_retry("test", 3, || {
        calls += 1;
        Err(ureq::Error::StatusCode(401))
    });

    assert_eq!(calls, 1);
    let err = result.expect_err("401 should fail");
    assert!(err.to_string().contains("HTTP error 401"));
}

#[test]
fn single_attempt_surfaces_transient_error() {
    let mut calls = 0;
    let result = send_with_retry("test", 1, || {
        calls += 1;
        Err(ureq::Error::StatusCode(502))
    });

    assert_eq!(calls, 1);
    assert!(result.is_err());
}

#[test]
fn zero_attempts_still_tries_once() {
    let mut calls = 0;
    let result = send_with_retry("test", 0, || {
        calls += 1;
        Ok("ok".to_string())
    });

    assert_eq!(calls, 1);
    assert_eq!(result.expect("request should succeed"), "ok");
}

#[test]
fn transient_error_is_retried() {
    let mut calls = 0;
    let result = send_with_retry("test", 2, || {
        calls += 1;
        if calls == 1 {
            Err(ureq::Error::ConnectionFailed)
        } else {
            Ok("recovered".to_string())
        }
    });

    assert_eq!(calls, 2);
    assert_eq!(result.expect("second attempt should succeed"), "recovered");
}
