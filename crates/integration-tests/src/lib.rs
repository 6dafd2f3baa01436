//! Integration tests for the IceCream API.
//!
//! The tests talk to a running server over HTTP, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start Redis and the API
//! redis-server &
//! cargo run -p icecream-api &
//!
//! # Run integration tests
//! cargo test -p icecream-integration-tests -- --ignored
//! ```
//!
//! Set `ICECREAM_BASE_URL` to point the tests at another server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use uuid::Uuid;

/// Base URL of the API under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("ICECREAM_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Build a URL for `path` on the API under test.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// HTTP client for the tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A login no earlier run has registered.
#[must_use]
pub fn unique_login(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
