//! Home page route handler.

use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Plain-text banner with the number of ice creams on offer.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<String> {
    let count = state.ice_creams().count().await?;
    Ok(format!("IceCream API: {count} ice creams on the menu"))
}
