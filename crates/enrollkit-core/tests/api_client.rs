mod common;

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use enrollkit_core::auth::ValidationError;
use enrollkit_core::models::{EnrollmentFilter, RegistrationRequest, UserGender};
use enrollkit_core::{ApiError, AuthenticationError, OutboundRequest, SessionError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::*;

const ENROLLMENTS: &str = "/api/student/get/enrollments";
const SECTIONS: &str = "/api/enrollment/allowed-sections";
const SIGN_OUT: &str = "/api/user/sign-out";

fn empty_list() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([]))
}

#[tokio::test]
async fn test_attaches_bearer_token() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&h.server)
        .await;

    let sections = h.api.allowed_sections().await.unwrap();
    assert!(sections.is_empty());
}

#[tokio::test]
async fn test_proactive_refresh_past_skew_makes_one_call() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(token_response("access-2"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(empty_list())
        .expect(2)
        .mount(&h.server)
        .await;

    h.clock.advance(ChronoDuration::minutes(13) + ChronoDuration::seconds(1));
    h.api.allowed_sections().await.unwrap();

    // The refreshed token is fresh again; no second refresh
    h.api.allowed_sections().await.unwrap();
}

#[tokio::test]
async fn test_proactive_refresh_failure_does_not_fail_request() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .respond_with(empty_list())
        .expect(1)
        .mount(&h.server)
        .await;

    h.clock.advance(ChronoDuration::minutes(14));
    h.api.allowed_sections().await.unwrap();

    // Fail closed: the session is gone and nothing was attached
    assert!(!h.session.is_valid());
    assert_eq!(authorization_headers(&h.server, SECTIONS).await, vec![None]);
}

#[tokio::test]
async fn test_parallel_unauthorized_requests_share_one_refresh() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path(ENROLLMENTS))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(unauthorized("Token expired"))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENROLLMENTS))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(empty_list())
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(token_response("access-2").set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&h.server)
        .await;

    let (first, second) = tokio::join!(h.api.my_enrollments(), h.api.my_enrollments());

    assert!(first.unwrap().is_empty());
    assert!(second.unwrap().is_empty());
    assert_eq!(h.session.access_token().as_deref(), Some("access-2"));
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path(ENROLLMENTS))
        .respond_with(unauthorized("Forbidden for this user"))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(token_response("access-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.my_enrollments().await.unwrap_err();

    assert!(matches!(err, SessionError::AuthorizationRetryExhausted));
    assert!(err.requires_sign_in());
    assert!(h.session.session().is_none());
    assert_eq!(
        authorization_headers(&h.server, ENROLLMENTS).await,
        vec![
            Some("Bearer access-1".to_string()),
            Some("Bearer access-2".to_string())
        ]
    );
}

#[tokio::test]
async fn test_failed_refresh_propagates_and_fails_closed() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path(ENROLLMENTS))
        .respond_with(unauthorized("Token expired"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(unauthorized("Invalid or expired refresh token"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.my_enrollments().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Authentication(AuthenticationError::Rejected { status: 401, .. })
    ));
    assert!(!h.session.is_valid());

    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .respond_with(empty_list())
        .expect(1)
        .mount(&h.server)
        .await;

    h.api.allowed_sections().await.unwrap();
    assert_eq!(authorization_headers(&h.server, SECTIONS).await, vec![None]);
}

#[tokio::test]
async fn test_refresh_endpoint_is_exempt_from_retry() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(unauthorized("No refresh token provided"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .api
        .execute(OutboundRequest::post("/user/authenticate/refresh-token"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ApiError::Unauthorized(_))));
    assert_eq!(authorization_headers(&h.server, REFRESH).await, vec![None]);
    // Exempt calls do not touch the session
    assert!(h.session.is_valid());
}

#[tokio::test]
async fn test_unauthenticated_start_recovers_through_cookie() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .and(header("authorization", "Bearer access-7"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(SECTIONS))
        .respond_with(unauthorized("Not authenticated"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(token_response("access-7"))
        .expect(1)
        .mount(&h.server)
        .await;

    h.api.allowed_sections().await.unwrap();
    assert!(h.session.is_valid());
}

#[tokio::test]
async fn test_other_errors_leave_session_alone() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/api/student/get/next-term"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No upcoming term"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.my_next_term().await.unwrap_err();
    match err {
        SessionError::Api(ApiError::NotFound(detail)) => assert_eq!(detail, "No upcoming term"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.session.is_valid());
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("POST"))
        .and(path(SIGN_OUT))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Signed out"})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.api.sign_out().await.unwrap());
    assert!(h.session.session().is_none());
}

#[tokio::test]
async fn test_sign_out_failure_keeps_session() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("POST"))
        .and(path(SIGN_OUT))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Database unavailable"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.sign_out().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(ApiError::ServerError(_))));
    assert!(h.session.is_valid());
}

#[tokio::test]
async fn test_filtered_enrollments_sends_only_set_ids() {
    let h = harness().await;
    sign_in(&h, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/api/enrollment/filter"))
        .and(query_param("term_id", "t1"))
        .and(query_param("program_id", "p1"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&h.server)
        .await;

    let filter = EnrollmentFilter {
        program_id: Some("p1".to_string()),
        term_id: Some("t1".to_string()),
        ..Default::default()
    };
    assert!(h.api.filtered_enrollments(&filter).await.unwrap().is_empty());

    let requests = h.server.received_requests().await.unwrap();
    let query = requests
        .iter()
        .find(|r| r.url.path() == "/api/enrollment/filter")
        .and_then(|r| r.url.query())
        .unwrap_or_default()
        .to_string();
    assert!(!query.contains("department_id"));
}

#[tokio::test]
async fn test_register_validates_then_posts_without_session() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/user/registration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "created_at": "2026-01-15T09:29:00Z",
            "first_name": "Ana",
            "last_name": "Lim",
            "gender": "Female",
            "email": "ana.lim@school.edu",
            "cellphone_number": "09171234567",
            "role": null,
            "is_active": false
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut request = RegistrationRequest {
        email: "ana.lim@school.edu".to_string(),
        cellphone_number: "0917".to_string(),
        password: "correct-horse".to_string(),
        role: None,
        first_name: "Ana".to_string(),
        middle_name: None,
        last_name: "Lim".to_string(),
        suffix: None,
        age: Some(18),
        gender: UserGender::Female,
        complete_address: None,
    };

    let err = h.api.register(&request).await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(ValidationError::InvalidCellphone)));

    request.cellphone_number = "09171234567".to_string();
    let user = h.api.register(&request).await.unwrap();
    assert_eq!(user.email, "ana.lim@school.edu");
    assert!(!user.is_active);
    assert_eq!(
        authorization_headers(&h.server, "/api/user/registration").await,
        vec![None]
    );
}
