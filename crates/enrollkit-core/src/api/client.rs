//! API client for communicating with the enrollment REST API.
//!
//! Every secured call goes through [`ApiClient::execute`]:
//! before sending, the session is refreshed if it is inside the skew window
//! and the bearer token is attached while valid; after receiving a 401 the
//! session is refreshed (joining any refresh already running) and the
//! request is sent again, once.

use anyhow::Context;
use reqwest::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{validate_registration, SessionManager};
use crate::config::Config;
use crate::models::{
    ClassSectionResponse, EmployeeResponse, EnrollmentFilter, EnrollmentResponse,
    EnrollmentStatus, RegistrationRequest, StudentResponse, TermResponse, UpdateEnrollmentStatus,
    UserResponse,
};

use super::{ApiError, SessionError};

// ============================================================================
// Endpoints
// ============================================================================

const SIGN_OUT_PATH: &str = "/user/sign-out";
const REGISTRATION_PATH: &str = "/user/registration";

/// An HTTP call description that can be sent again after a refresh.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    retried: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, SessionError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Whether this request has already been resent after a refresh
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// API client for the enrollment service.
/// Clone is cheap - the session manager and reqwest client are shared.
#[derive(Clone)]
pub struct ApiClient {
    session: SessionManager,
}

impl ApiClient {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Create a client and session manager from the loaded configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let session =
            SessionManager::from_config(config).context("Failed to create session manager")?;
        Ok(Self::new(session))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Before hook plus send. The refresh endpoint bypasses the session
    /// entirely so a refresh can never trigger another refresh.
    async fn dispatch(&self, request: &OutboundRequest) -> Result<Response, SessionError> {
        let exempt = SessionManager::is_refresh_path(&request.path);
        if !exempt {
            self.session.ensure_fresh().await;
        }

        let mut builder = self
            .session
            .http()
            .request(request.method.clone(), self.session.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if !exempt {
            if let Some(token) = self.session.access_token() {
                builder = builder.bearer_auth(token);
            }
        }

        debug!(
            method = %request.method,
            path = %request.path,
            retried = request.is_retried(),
            "Sending request"
        );
        Ok(builder.send().await?)
    }

    /// Send a request through the session pipeline.
    ///
    /// A 401 triggers one refresh and one resend. A second 401 clears the
    /// session and fails with `AuthorizationRetryExhausted`.
    pub async fn execute(&self, mut request: OutboundRequest) -> Result<Response, SessionError> {
        loop {
            let response = self.dispatch(&request).await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || SessionManager::is_refresh_path(&request.path)
            {
                return Self::check_response(response).await;
            }

            if request.is_retried() {
                warn!(path = %request.path, "Still unauthorized after refresh, giving up");
                self.session.clear();
                return Err(SessionError::AuthorizationRetryExhausted);
            }

            request.mark_retried();
            info!(path = %request.path, "Unauthorized, refreshing session before retrying");
            // A failed refresh has already cleared the session.
            self.session.refresh().await?;
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, SessionError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, SessionError> {
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
                .into()
        })
    }

    pub(super) async fn fetch<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T, SessionError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        Self::parse(response, &path).await
    }

    pub(super) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.fetch(OutboundRequest::get(path)).await
    }

    // ===== Account =====

    /// Create an account. Runs the local registration checks first and
    /// sends without a session.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<UserResponse, SessionError> {
        validate_registration(request)?;

        let response = self
            .session
            .http()
            .post(self.session.url(REGISTRATION_PATH))
            .json(request)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let user: UserResponse = Self::parse(response, REGISTRATION_PATH).await?;
        info!(email = %user.email, "Registration submitted");
        Ok(user)
    }

    /// End the server session. The local session is cleared only once the
    /// server has confirmed; on failure it is left for the caller to decide.
    pub async fn sign_out(&self) -> Result<bool, SessionError> {
        match self.execute(OutboundRequest::post(SIGN_OUT_PATH)).await {
            Ok(_) => {
                info!("Signed out");
                self.session.clear();
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Error during sign-out");
                Err(e)
            }
        }
    }

    // ===== Student =====

    pub async fn current_student(&self) -> Result<StudentResponse, SessionError> {
        self.get("/student/get/current-student").await
    }

    pub async fn my_enrollments(&self) -> Result<Vec<EnrollmentResponse>, SessionError> {
        self.get("/student/get/enrollments").await
    }

    /// The term the student is currently enrolled in
    pub async fn my_current_term(&self) -> Result<TermResponse, SessionError> {
        self.get("/student/get/current-term").await
    }

    /// The next term the student still needs to enroll in
    pub async fn my_next_term(&self) -> Result<TermResponse, SessionError> {
        self.get("/student/get/next-term").await
    }

    // ===== Enrollment =====

    /// Sections the signed-in student may enroll in
    pub async fn allowed_sections(&self) -> Result<Vec<ClassSectionResponse>, SessionError> {
        self.get("/enrollment/allowed-sections").await
    }

    pub async fn enroll_student(
        &self,
        student_id: &str,
        class_section_id: &str,
    ) -> Result<EnrollmentResponse, SessionError> {
        let path = format!(
            "/enrollment/student/{}/class_section/{}",
            student_id, class_section_id
        );
        self.fetch(OutboundRequest::post(path)).await
    }

    /// All enrollments (registrar only)
    pub async fn all_enrollments(&self) -> Result<Vec<EnrollmentResponse>, SessionError> {
        self.get("/enrollment/get-enrollments").await
    }

    /// Enrollments matching a filter (registrar only)
    pub async fn filtered_enrollments(
        &self,
        filter: &EnrollmentFilter,
    ) -> Result<Vec<EnrollmentResponse>, SessionError> {
        self.fetch(OutboundRequest::get("/enrollment/filter").query(filter.query_pairs()))
            .await
    }

    /// Approve or reject enrollments in bulk (registrar only)
    pub async fn update_enrollment_status(
        &self,
        update: &UpdateEnrollmentStatus,
    ) -> Result<Vec<EnrollmentResponse>, SessionError> {
        let request = OutboundRequest::patch("/enrollment/status").json(update)?;
        self.fetch(request).await
    }

    pub async fn enrollments_by_status(
        &self,
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentResponse>, SessionError> {
        self.get(&format!("/enrollment/list/status/{}", status)).await
    }

    // ===== Employees =====

    pub async fn current_dean(&self) -> Result<EmployeeResponse, SessionError> {
        self.get("/dean/get/current-dean").await
    }

    pub async fn current_program_chair(&self) -> Result<EmployeeResponse, SessionError> {
        self.get("/program_chair/get/current-program-chair").await
    }
}
