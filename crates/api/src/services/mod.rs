//! Business logic services for the API.
//!
//! # Services
//!
//! - `auth` - Registration, login, and HTTP Basic credential checks
//! - `images` - Mirroring product images into the static directory

pub mod auth;
pub mod images;

pub use auth::{AuthError, AuthService};
pub use images::{HttpImageMirror, ImageError, ImageMirror};
