//! # murmur_core
//!
//! Core domain logic for Murmur: the key/value store, credentials, session
//! tokens, the social graph and the feed snapshot.

pub mod auth;
pub mod feed;
pub mod graph;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
