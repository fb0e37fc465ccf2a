use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use oasis_core::cabins::list_cabins;
use oasis_core::models::CabinId;
use oasis_core::{paths, CapacityFilter};
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CabinsQuery {
    pub capacity: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cabins", get(get_cabins))
        .route("/cabins/{id}", get(get_cabin))
}

/// GET /cabins?capacity=small
/// 204 when there are no cabins at all.
async fn get_cabins(
    State(state): State<AppState>,
    Query(query): Query<CabinsQuery>,
) -> Result<Response, AppError> {
    let filter = match query.capacity.as_deref() {
        Some(tag) => tag.parse::<CapacityFilter>()?,
        None => CapacityFilter::All,
    };

    let cabins = state
        .cabins
        .list_cabins()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Cabins could not be loaded: {}", e)))?;

    match list_cabins(&cabins, filter) {
        Some(displayed) => {
            debug!("Listing {} of {} cabins for capacity {}", displayed.len(), cabins.len(), filter);
            Ok(Json(displayed).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /cabins/:id
/// Served from the page cache when a render is available.
async fn get_cabin(
    State(state): State<AppState>,
    Path(cabin_id): Path<CabinId>,
) -> Result<Response, AppError> {
    let path = paths::cabin(cabin_id);

    if let Some(body) = state.pages.get(&path).await {
        debug!("Page cache hit for {}", path);
        return Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response());
    }

    let cabin = state
        .cabins
        .get_cabin(cabin_id)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Cabin could not be loaded: {}", e)))?
        .ok_or_else(|| AppError::NotFoundError(format!("Cabin {} not found", cabin_id)))?;

    let body = serde_json::to_string(&cabin)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    state.pages.put(&path, &body).await;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
