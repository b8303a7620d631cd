//! Authentication primitives.
//!
//! - [`jwt`] -- bearer-token validation and claim access.

pub mod jwt;
