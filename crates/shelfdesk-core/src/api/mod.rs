//! REST API client module for the library backend.
//!
//! This module provides the `SessionClient` for issuing the harness's
//! requests: login, book CRUD, reservations, loan returns, the admin
//! dashboard and the notification triggers.
//!
//! The API uses JWT bearer token authentication obtained from the
//! `token/` endpoint.

pub mod client;
pub mod error;

pub use client::SessionClient;
pub use error::ApiError;
