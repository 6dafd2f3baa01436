//! Ice-cream route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use icecream_core::{IceCream, IceCreamId, IceCreamPatch, NewIceCream};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::state::AppState;

/// List all ice creams in creation order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<IceCream>>> {
    Ok(Json(state.ice_creams().list().await?))
}

/// Show one ice cream.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<IceCreamId>,
) -> Result<Json<IceCream>> {
    state
        .ice_creams()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("not found".to_string()))
}

/// Create an ice cream. Any client-sent id is ignored.
#[instrument(skip_all, fields(name = %new.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewIceCream>,
) -> Result<(StatusCode, Json<IceCream>)> {
    new.validate()?;
    let ice_cream = state.ice_creams().create(new).await?;
    Ok((StatusCode::CREATED, Json(ice_cream)))
}

/// Merge the supplied fields into an ice cream.
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<IceCreamId>,
    Json(patch): Json<IceCreamPatch>,
) -> Result<Json<IceCream>> {
    patch.validate()?;
    Ok(Json(state.ice_creams().update(id, &patch).await?))
}

/// Delete an ice cream.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<IceCreamId>,
) -> Result<StatusCode> {
    state.ice_creams().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
