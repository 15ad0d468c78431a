//! Client library for the university enrollment-management API.
//!
//! The interesting part is the session layer in [`auth`]: access tokens
//! are held in memory, refreshed ahead of expiry, and refreshed at most
//! once at a time no matter how many requests notice expiry together.
//! [`api::ApiClient`] wraps every secured call with that layer and retries
//! a request once after a 401.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthenticationError, OutboundRequest, SessionError};
pub use auth::{Credentials, Session, SessionManager, SessionPolicy};
pub use config::Config;
