//! Seed the store with users and ice creams from a JSON file.
//!
//! The file has the shape
//!
//! ```json
//! {
//!   "users": [{ "login": "bestboss", "password": "secret" }],
//!   "icecreams": [{ "name": "Hot Summer", "price": 35.4, "weight": 50, "img_url": "https://..." }]
//! }
//! ```
//!
//! Users whose login is already taken are skipped and reported. Ice creams
//! are always created under fresh ids, so running a seed twice duplicates
//! the menu.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use icecream_api::db::{IceCreamRepository, RepositoryError};
use icecream_api::services::{AuthError, AuthService};
use icecream_core::{Credentials, Login, NewIceCream, ValidationError};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("Failed to read seed file: {0}")]
    Read(#[from] std::io::Error),

    /// The seed file is not valid seed JSON.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// An ice cream in the file fails validation.
    #[error("Ice cream #{index} is invalid: {source}")]
    InvalidIceCream {
        index: usize,
        source: ValidationError,
    },

    /// Registering a user failed for a reason other than a taken login.
    #[error("Failed to create user: {0}")]
    Auth(#[from] AuthError),

    /// Storing an ice cream failed.
    #[error("Failed to create ice cream: {0}")]
    Repository(#[from] RepositoryError),
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<Credentials>,
    #[serde(default)]
    pub icecreams: Vec<NewIceCream>,
}

impl SeedFile {
    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Read` or `SeedError::Parse`.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check every ice cream before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::InvalidIceCream` for the first invalid entry.
    pub fn validate(&self) -> Result<(), SeedError> {
        for (index, ice_cream) in self.icecreams.iter().enumerate() {
            ice_cream
                .validate()
                .map_err(|source| SeedError::InvalidIceCream { index, source })?;
        }
        Ok(())
    }
}

/// What a seed run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_skipped: Vec<Login>,
    pub ice_creams_created: usize,
}

/// Seed the configured store from `file_path`.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store is unreachable,
/// or the file cannot be loaded or stored.
pub async fn from_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let seed_file = SeedFile::load(Path::new(file_path))?;

    let state = super::connect().await?;
    let report = seed(&state.auth(), &state.ice_creams(), seed_file).await?;

    for login in &report.users_skipped {
        warn!(login = %login, "User already exists, skipped");
    }
    info!(
        users_created = report.users_created,
        users_skipped = report.users_skipped.len(),
        ice_creams_created = report.ice_creams_created,
        "Seed complete"
    );

    Ok(())
}

/// Create every user and ice cream in `seed_file`.
///
/// # Errors
///
/// Returns `SeedError::InvalidIceCream` before writing anything if an entry
/// is invalid, otherwise the first store failure.
pub async fn seed(
    auth: &AuthService<'_>,
    ice_creams: &IceCreamRepository<'_>,
    seed_file: SeedFile,
) -> Result<SeedReport, SeedError> {
    seed_file.validate()?;
    let mut report = SeedReport::default();

    for credentials in &seed_file.users {
        match auth.register(credentials).await {
            Ok(_) => report.users_created += 1,
            Err(AuthError::UserAlreadyExists) => {
                report.users_skipped.push(credentials.login.clone());
            }
            Err(e) => return Err(e.into()),
        }
    }

    for ice_cream in seed_file.icecreams {
        ice_creams.create(ice_cream).await?;
        report.ice_creams_created += 1;
    }

    Ok(report)
}
