//! Domain logic for the Reetr admin panel.
//!
//! Everything in this crate is pure and synchronous: the assessment editing
//! model, life-hack forms, and admin-claim detection. Network access and
//! logging live in `reetr-backend` and `reetr-api`.

pub mod admin;
pub mod assessment;
pub mod error;
pub mod life_hack;
pub mod types;
