//! HTTP middleware and extractors for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is per handler through the extractors in `basic_auth`.

pub mod basic_auth;
pub mod request_id;

pub use basic_auth::{Authenticated, BasicCredentials};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
