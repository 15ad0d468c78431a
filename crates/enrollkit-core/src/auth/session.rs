use chrono::{DateTime, Duration, Utc};

use crate::models::UserRole;

/// Default access-token lifetime assumed after login or refresh.
/// Must match or be looser than the server-side TTL.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Default buffer before expiry at which the token stops being used
/// and a proactive refresh is started.
pub const DEFAULT_REFRESH_SKEW_MINUTES: i64 = 2;

/// Upper bound on a single refresh call. Every pending request waits on
/// the in-flight refresh, so it must never hang.
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

/// Timing policy for issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub token_ttl: Duration,
    pub refresh_skew: Duration,
    pub refresh_timeout: std::time::Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            refresh_skew: Duration::minutes(DEFAULT_REFRESH_SKEW_MINUTES),
            refresh_timeout: std::time::Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
        }
    }
}

/// An access token held in memory. Never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Option<UserRole>,
}

// Keep tokens out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("role", &self.role)
            .finish()
    }
}

impl Session {
    pub fn issue(access_token: String, role: Option<UserRole>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            access_token,
            expires_at: now + ttl,
            role,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable for requests: strictly before `expires_at - skew`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        now < self.expires_at - skew
    }

    /// Check if the session is inside the refresh window
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        !self.is_valid_at(now, skew)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_minutes().max(0)
    }
}
