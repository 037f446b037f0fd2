//! Authentication state for the harness.
//!
//! This module provides:
//! - `Session`: the single bearer credential, with an explicit logout
//! - `Credentials`: login form values sent to the token endpoint
//!
//! Sessions live in memory only and are lost when the process exits.

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub(crate) use credentials::TokenResponse;
pub use session::{Session, SessionData, SessionUser};
