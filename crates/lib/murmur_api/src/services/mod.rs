//! Services used by handlers.

pub mod auth;
pub mod cookies;
