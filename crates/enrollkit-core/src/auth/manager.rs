//! In-memory access-token lifecycle.
//!
//! The manager owns the current `Session` and the single in-flight refresh.
//! A refresh is shared: every caller that asks for one while another is
//! running awaits the same future and sees the same outcome, so a burst of
//! expired requests costs one network call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::session::{Session, SessionPolicy};
use super::validation::Credentials;
use crate::api::{ApiError, AuthenticationError, SessionError};
use crate::config::Config;
use crate::models::UserRole;

/// Login endpoint, relative to the API base
pub const LOGIN_PATH: &str = "/user/authenticate/token";

/// Refresh endpoint, authenticated by the session cookie only
pub const REFRESH_PATH: &str = "/user/authenticate/refresh-token";

type RefreshOutcome = std::result::Result<(), AuthenticationError>;
type RefreshEpisode = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
}

/// Build the HTTP client shared by the session manager and the API client.
/// The cookie store carries the server's refresh-token cookie between calls.
pub fn build_http_client(request_timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .timeout(request_timeout)
        .build()
}

/// Session token manager.
/// Clone is cheap - all clones share the same session and refresh slot.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: String,
    policy: SessionPolicy,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<Session>>,
    refresh: Mutex<Option<RefreshEpisode>>,
}

impl SessionManager {
    pub fn new(http: Client, base_url: impl Into<String>, policy: SessionPolicy) -> Self {
        Self::with_clock(http, base_url, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http: Client,
        base_url: impl Into<String>,
        policy: SessionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                policy,
                clock,
                session: Mutex::new(None),
                refresh: Mutex::new(None),
            }),
        }
    }

    /// Create a manager with its own HTTP client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = config.policy()?;
        let http = build_http_client(config.request_timeout())
            .context("Failed to build HTTP client")?;
        Ok(Self::new(http, config.base_url.clone(), policy))
    }

    pub fn http(&self) -> &Client {
        &self.inner.http
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn policy(&self) -> SessionPolicy {
        self.inner.policy
    }

    pub fn url(&self, path: &str) -> String {
        self.inner.url(path)
    }

    /// Whether a path targets the refresh endpoint, which is exempt from
    /// proactive refresh and from retry-after-401.
    pub fn is_refresh_path(path: &str) -> bool {
        path.contains(REFRESH_PATH)
    }

    /// Sign in with email and password and hold the issued access token.
    /// Nothing is stored when validation, transport or the server fails.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        credentials.validate()?;

        let email = credentials.email.trim();
        debug!(email = email, "Sending authentication request");

        let response = self
            .inner
            .http
            .post(self.url(LOGIN_PATH))
            .form(&[("email", email), ("password", credentials.password.as_str())])
            .send()
            .await
            .map_err(|e| AuthenticationError::Unreachable(e.to_string()))?;

        let (token, role) = match read_grant(response).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(email = email, error = %e, "Authentication failed");
                return Err(e.into());
            }
        };

        let session = self.inner.store(token, role);
        info!(role = ?session.role, expires_at = %session.expires_at, "Authenticated");
        Ok(session)
    }

    /// True iff a token is held and the refresh threshold has not been reached.
    pub fn is_valid(&self) -> bool {
        let now = self.inner.clock.now();
        let skew = self.inner.policy.refresh_skew;
        self.inner
            .lock_session()
            .as_ref()
            .is_some_and(|s| s.is_valid_at(now, skew))
    }

    /// The bearer token, only while it is valid
    pub fn access_token(&self) -> Option<String> {
        let now = self.inner.clock.now();
        let skew = self.inner.policy.refresh_skew;
        self.inner
            .lock_session()
            .as_ref()
            .filter(|s| s.is_valid_at(now, skew))
            .map(|s| s.access_token.clone())
    }

    /// Snapshot of the held session, valid or not
    pub fn session(&self) -> Option<Session> {
        self.inner.lock_session().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.lock_refresh().is_some()
    }

    /// Drop the held session
    pub fn clear(&self) {
        if self.inner.lock_session().take().is_some() {
            info!("Session cleared");
        }
    }

    /// Refresh ahead of expiry when the held token has entered the skew
    /// window and no refresh is running. A failure here is logged and
    /// swallowed; the 401 retry path remains as the backstop.
    pub async fn ensure_fresh(&self) {
        let due = {
            let now = self.inner.clock.now();
            let skew = self.inner.policy.refresh_skew;
            self.inner
                .lock_session()
                .as_ref()
                .is_some_and(|s| s.needs_refresh_at(now, skew))
        };
        if !due || self.is_refreshing() {
            return;
        }

        info!("Access token is inside the refresh window, refreshing proactively");
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Proactive refresh failed");
        }
    }

    /// Obtain a new access token using the session cookie.
    ///
    /// Joins the in-flight refresh if there is one; otherwise starts a new
    /// episode. On failure the session is cleared and every joined caller
    /// receives the same error. Dropping the returned future does not
    /// cancel the episode.
    pub async fn refresh(&self) -> std::result::Result<(), AuthenticationError> {
        let episode = {
            let mut slot = self.inner.lock_refresh();
            match slot.as_ref() {
                Some(existing) => {
                    debug!("Refresh already in progress, waiting");
                    existing.clone()
                }
                None => {
                    let episode = self.start_episode();
                    *slot = Some(episode.clone());
                    episode
                }
            }
        };
        episode.await
    }

    /// Run the refresh on its own task so it settles and frees the slot
    /// even when every caller awaiting it has been dropped.
    fn start_episode(&self) -> RefreshEpisode {
        let task = tokio::spawn(Arc::clone(&self.inner).run_refresh());
        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Token refresh task aborted, clearing session");
                    inner.lock_session().take();
                    inner.lock_refresh().take();
                    Err(AuthenticationError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Recover a session after a restart, when only the cookie survives.
    /// Returns whether a session is now held; routing is the caller's job.
    /// A held token that has not expired is kept as-is, since the request
    /// pipeline refreshes it once it enters the skew window.
    pub async fn reinitialize(&self) -> bool {
        let now = self.inner.clock.now();
        {
            let mut held = self.inner.lock_session();
            match held.as_ref() {
                Some(s) if !s.is_expired_at(now) => {
                    debug!("Access token already in memory");
                    return true;
                }
                Some(_) => {
                    debug!("Held access token has expired, dropping it");
                    *held = None;
                }
                None => {}
            }
        }

        info!("No access token in memory, attempting to resume from session cookie");
        match self.refresh().await {
            Ok(()) => true,
            Err(e) => {
                info!(error = %e, "No resumable session");
                false
            }
        }
    }
}

impl Inner {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, Option<RefreshEpisode>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the session with a freshly issued token. A refresh response
    /// carries no role, so the previous one is kept.
    fn store(&self, token: String, role: Option<UserRole>) -> Session {
        let now = self.clock.now();
        let mut guard = self.lock_session();
        let role = role.or_else(|| guard.as_ref().and_then(|s| s.role));
        let session = Session::issue(token, role, now, self.policy.token_ttl);
        *guard = Some(session.clone());
        session
    }

    async fn run_refresh(self: Arc<Self>) -> RefreshOutcome {
        let limit = self.policy.refresh_timeout;
        let outcome = match tokio::time::timeout(limit, self.request_refresh()).await {
            Ok(result) => result,
            Err(_) => Err(AuthenticationError::TimedOut(limit)),
        };

        let result = match outcome {
            Ok((token, role)) => {
                let session = self.store(token, role);
                info!(expires_at = %session.expires_at, "Token refresh successful");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.lock_session().take();
                Err(e)
            }
        };

        // Settled either way; the next caller starts a new episode.
        self.lock_refresh().take();
        result
    }

    async fn request_refresh(
        &self,
    ) -> std::result::Result<(String, Option<UserRole>), AuthenticationError> {
        debug!("Requesting new access token with session cookie");
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AuthenticationError::Unreachable(e.to_string()))?;
        read_grant(response).await
    }
}

/// Turn a login or refresh response into a token and role.
async fn read_grant(
    response: reqwest::Response,
) -> std::result::Result<(String, Option<UserRole>), AuthenticationError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthenticationError::Rejected {
            status: status.as_u16(),
            detail: ApiError::detail(&body),
        });
    }

    let grant: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthenticationError::Malformed(e.to_string()))?;

    match grant.access_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok((token, grant.role)),
        None => Err(AuthenticationError::MissingToken),
    }
}
