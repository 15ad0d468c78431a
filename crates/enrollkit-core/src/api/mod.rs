//! REST API client module for the university enrollment service.
//!
//! This module provides the `ApiClient`, a wrapper around `reqwest` that
//! attaches the session's bearer token to every secured call and retries
//! a request once after refreshing the session when the server answers 401.
//!
//! The refresh token itself lives in an HTTP-only cookie held by the
//! client's cookie store and is never read by this crate.

pub mod client;
pub mod error;
mod structure;

pub use client::{ApiClient, OutboundRequest};
pub use error::{ApiError, AuthenticationError, SessionError};
