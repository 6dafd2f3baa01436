//! IceCream API library.
//!
//! REST backend for the IceCream mobile app: ice-cream catalogue CRUD, user
//! registration with HTTP Basic authentication, and per-user orders, all
//! persisted in Redis. Exposed as a library so the binary, the CLI and the
//! tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
