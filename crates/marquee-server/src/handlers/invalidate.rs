//! Cache invalidation endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::cache::InvalidationTag;
use crate::error::ApiError;
use crate::extractors::MovieIdPath;
use crate::state::AppState;

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Número de entries invalidadas.
    pub invalidated: usize,
    /// Tags afectados.
    pub tags: Vec<String>,
    /// Mensaje descriptivo.
    pub message: String,
}

/// DELETE /cache
/// Invalida toda la cache.
#[instrument(skip_all)]
pub async fn invalidate_all(State(state): State<AppState>) -> Result<Response, ApiError> {
    let result = state.catalog().invalidate_all().await;

    tracing::info!(count = result.count, "All cache entries invalidated");

    Ok((
        StatusCode::OK,
        Json(InvalidateResponse {
            invalidated: result.count,
            message: format!("Invalidated all {} cache entries", result.count),
            tags: result.tags,
        }),
    )
        .into_response())
}

/// DELETE /cache/movies
/// Invalida todas las entries a nivel coleccion (list/search/popular/
/// recommendations), sin tocar las entries por id.
#[instrument(skip_all)]
pub async fn invalidate_collections(State(state): State<AppState>) -> Result<Response, ApiError> {
    let result = state
        .coordinator()
        .invalidate(&InvalidationTag::Collection)
        .await;

    tracing::info!(count = result.count, "Collection cache entries invalidated");

    Ok((
        StatusCode::OK,
        Json(InvalidateResponse {
            invalidated: result.count,
            message: format!("Invalidated {} collection cache entries", result.count),
            tags: result.tags,
        }),
    )
        .into_response())
}

/// DELETE /cache/movies/{id}
/// Invalida las entries derivadas de un record especifico.
#[instrument(skip_all, fields(id = %path.id))]
pub async fn invalidate_movie(
    State(state): State<AppState>,
    Path(path): Path<MovieIdPath>,
) -> Result<Response, ApiError> {
    let id = path.movie_id()?;
    let result = state.catalog().invalidate_record(id).await;

    tracing::info!(
        id = %id,
        count = result.count,
        "Cache entries invalidated"
    );

    Ok((
        StatusCode::OK,
        Json(InvalidateResponse {
            invalidated: result.count,
            message: format!("Invalidated {} cache entries for movie '{}'", result.count, id),
            tags: result.tags,
        }),
    )
        .into_response())
}
