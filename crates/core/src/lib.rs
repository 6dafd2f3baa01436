//! IceCream Core - Shared domain types.
//!
//! This crate provides the types used across all IceCream API components:
//! - `api` - The HTTP service backing the mobile app
//! - `cli` - Operator tools for seeding and inspecting the store
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no store
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, logins, and the ice-cream, user and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
