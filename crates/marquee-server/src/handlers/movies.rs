//! Movie catalog endpoint handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use marquee_core::{Genre, MovieId, MovieRecord, QueryKind, ResultSet};

use crate::error::ApiError;
use crate::extractors::{MovieIdPath, MovieQuery};
use crate::state::AppState;

/// Body para POST /movies y PUT /movies/{id}.
#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub year: u16,
    pub rating: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub popularity: f64,
}

impl MovieRequest {
    /// Valida el body y lo convierte en un record con el id dado.
    fn into_record(self, id: MovieId) -> Result<MovieRecord, ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
        }
        if !(0.0..=10.0).contains(&self.rating) {
            return Err(ApiError::BadRequest(format!(
                "Rating must be between 0.0 and 10.0, got {}",
                self.rating
            )));
        }
        if self.popularity < 0.0 {
            return Err(ApiError::BadRequest(
                "Popularity cannot be negative".to_string(),
            ));
        }

        Ok(MovieRecord {
            id,
            title: self.title.trim().to_string(),
            genres: self
                .genres
                .into_iter()
                .map(Genre::new)
                .filter(|g| !g.is_empty())
                .collect(),
            year: self.year,
            rating: self.rating,
            description: self.description,
            popularity: self.popularity,
        })
    }
}

async fn run_collection_query(
    state: &AppState,
    kind: QueryKind,
    query: MovieQuery,
) -> Result<Json<ResultSet>, ApiError> {
    let params = query.into_params().map_err(ApiError::BadRequest)?;
    let result = state.catalog().query(kind, params).await?;
    Ok(Json((*result).clone()))
}

/// Handler for GET /movies
#[instrument(skip_all)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<ResultSet>, ApiError> {
    run_collection_query(&state, QueryKind::List, query).await
}

/// Handler for GET /movies/search
#[instrument(skip_all, fields(q = query.q.as_deref().unwrap_or("")))]
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<ResultSet>, ApiError> {
    run_collection_query(&state, QueryKind::Search, query).await
}

/// Handler for GET /movies/popular
#[instrument(skip_all)]
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<ResultSet>, ApiError> {
    run_collection_query(&state, QueryKind::Popular, query).await
}

/// Handler for GET /movies/recommendations
#[instrument(skip_all)]
pub async fn recommended_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<ResultSet>, ApiError> {
    run_collection_query(&state, QueryKind::Recommendations, query).await
}

/// Handler for GET /movies/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(path): Path<MovieIdPath>,
) -> Result<Json<MovieRecord>, ApiError> {
    let id = path.movie_id()?;
    let result = state.catalog().get(id).await?;

    match result.items.first() {
        Some(record) => Ok(Json(record.clone())),
        None => Err(ApiError::NotFound { id: id.to_string() }),
    }
}

/// Handler for POST /movies
#[instrument(skip_all)]
pub async fn create_movie(
    State(state): State<AppState>,
    Json(body): Json<MovieRequest>,
) -> Result<Response, ApiError> {
    let record = body.into_record(MovieId::new())?;
    let created = record.clone();

    state.catalog().create(record).await?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// Handler for PUT /movies/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(path): Path<MovieIdPath>,
    Json(body): Json<MovieRequest>,
) -> Result<Json<MovieRecord>, ApiError> {
    let id = path.movie_id()?;
    let record = body.into_record(id)?;
    let updated = record.clone();

    state.catalog().update(record).await?;

    Ok(Json(updated))
}

/// Handler for DELETE /movies/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(path): Path<MovieIdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.movie_id()?;
    state.catalog().delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
