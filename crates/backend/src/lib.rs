//! REST client for the content backend.
//!
//! Life hacks and assessments are persisted by a separate backend service;
//! this crate wraps its `/v1` endpoints using [`reqwest`]. Every call is
//! authenticated with the caller's bearer token.

pub mod api;

pub use api::{BackendApi, BackendApiError};
