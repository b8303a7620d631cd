//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires admin claims.

pub mod auth;
pub mod rbac;
