//! Core types for the IceCream API.
//!
//! This module provides type-safe wrappers and records for the domain.

pub mod icecream;
pub mod id;
pub mod login;
pub mod order;
pub mod user;
pub mod validation;

pub use icecream::{IceCream, IceCreamPatch, NewIceCream};
pub use id::*;
pub use login::{Login, LoginError};
pub use order::{Order, OrderPosition};
pub use user::{Credentials, SessionToken, UserOut};
pub use validation::ValidationError;
