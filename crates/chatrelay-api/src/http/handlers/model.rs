//! Model catalog endpoints.
//!
//! GET /api/models       -- full upstream catalog (or `?free_only=true`)
//! GET /api/models/free  -- only models with zero prompt and completion cost

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use chatrelay_types::catalog::ModelInfo;
use chatrelay_types::error::ChatError;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListModelsQuery {
    #[serde(default)]
    pub free_only: bool,
}

/// GET /api/models -- list available models from the upstream catalog.
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> Result<Json<Vec<ModelInfo>>, AppError> {
    let models = state
        .provider
        .list_models(query.free_only)
        .await
        .map_err(|e| AppError::from(ChatError::Upstream(e)))?;
    Ok(Json(models))
}

/// GET /api/models/free -- shorthand for the free-tier listing.
pub async fn list_free_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelInfo>>, AppError> {
    let models = state
        .provider
        .list_models(true)
        .await
        .map_err(|e| AppError::from(ChatError::Upstream(e)))?;
    Ok(Json(models))
}
