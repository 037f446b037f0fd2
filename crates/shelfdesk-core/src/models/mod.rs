//! Data models for the library API.
//!
//! The harness treats backend records as opaque JSON, so the models here are
//! limited to what the client assembles or inspects:
//!
//! - `Payload`, `ApiResponse`: decoded response bodies
//! - `EntityKind`: backend collections addressed by the CRUD operations
//! - `Fields`, `BookFields`: request bodies built from form values

pub mod entity;
pub mod payload;

pub use entity::{BookFields, EntityKind, Fields};
pub use payload::{ApiResponse, Payload};
