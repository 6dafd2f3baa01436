//! CLI subcommands.

pub mod seed;
pub mod stats;

use icecream_api::config::ApiConfig;
use icecream_api::db;
use icecream_api::state::AppState;

/// Build application state from the environment, connected to the store.
async fn connect() -> Result<AppState, Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    let store = db::connect(&config.store).await?;
    store.ping().await?;
    Ok(AppState::new(config, store)?)
}
