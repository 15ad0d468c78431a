//! Authentication module for managing the access-token session.
//!
//! This module provides:
//! - `SessionManager`: in-memory token storage, proactive refresh and a
//!   single-flight refresh shared by every concurrent caller
//! - `Session` / `SessionPolicy`: the held token and its timing rules
//! - `Credentials` and the local validators run before anything is sent
//! - `CredentialStore`: optional OS keychain storage for the CLI
//!
//! Tokens live only in memory and are assumed to expire 15 minutes after
//! issue; they stop being attached 2 minutes before that.

pub mod clock;
pub mod credentials;
pub mod manager;
pub mod session;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::CredentialStore;
pub use manager::{build_http_client, SessionManager, LOGIN_PATH, REFRESH_PATH};
pub use session::{Session, SessionPolicy};
pub use validation::{validate_registration, Credentials, ValidationError};
