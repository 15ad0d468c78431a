#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use enrollkit_core::auth::{build_http_client, Clock, ManualClock};
use enrollkit_core::{ApiClient, Credentials, SessionManager, SessionPolicy};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN: &str = "/api/user/authenticate/token";
pub const REFRESH: &str = "/api/user/authenticate/refresh-token";

pub struct Harness {
    pub server: MockServer,
    pub clock: Arc<ManualClock>,
    pub session: SessionManager,
    pub api: ApiClient,
}

impl Harness {
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub async fn harness() -> Harness {
    harness_with_policy(SessionPolicy::default()).await
}

pub async fn harness_with_policy(policy: SessionPolicy) -> Harness {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let http = build_http_client(Duration::from_secs(5)).expect("Failed to build test client");
    let session = SessionManager::with_clock(
        http,
        format!("{}/api", server.uri()),
        policy,
        clock.clone(),
    );
    let api = ApiClient::new(session.clone());
    Harness {
        server,
        clock,
        session,
        api,
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("student@school.edu", "correct-horse")
}

pub fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "bearer",
    }))
}

pub fn login_response(token: &str, role: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", "refresh_token=cookie-1; HttpOnly; Path=/")
        .set_body_json(json!({
            "access_token": token,
            "refresh_token": "cookie-1",
            "token_type": "bearer",
            "role": role,
        }))
}

pub fn unauthorized(detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "detail": detail }))
}

/// Mount a one-shot login and sign in with it.
pub async fn sign_in(h: &Harness, token: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(login_response(token, "Student"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;

    h.session
        .authenticate(&credentials())
        .await
        .expect("sign in should succeed");
}

/// Authorization header values of every request received on a path.
pub async fn authorization_headers(server: &MockServer, request_path: &str) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}
