//! Core library for shelfdesk, a manual test bench for the library
//! management REST API.
//!
//! - `api`: the `SessionClient` and its error type
//! - `auth`: in-memory session and login credentials
//! - `harness`: harness actions as `Command` values and their presentation
//! - `config`: base URL and other settings
//! - `models`: response payloads and request bodies

pub mod api;
pub mod auth;
pub mod config;
pub mod harness;
pub mod models;
pub mod utils;

pub use api::{ApiError, SessionClient};
pub use auth::{Credentials, Session, SessionData, SessionUser};
pub use config::Config;
pub use harness::{dispatch, present, Command, DisplaySink, Outcome, Presentation, SinkId};
