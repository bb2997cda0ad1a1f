//! Request handlers for the three query shapes.

use crate::error::ApiError;
use atlas_model::{PokemonDetailed, PokemonId, PokemonKey, PokemonSummary};
use atlas_repo::Repository;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    limit: Option<String>,
}

pub async fn get_pokemon(
    State(repo): State<Arc<Repository>>,
    Path(name): Path<String>,
) -> Result<Json<PokemonSummary>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("pokemon name is required".to_string()));
    }
    let key = PokemonKey::parse(&name);
    Ok(Json(repo.get_pokemon(&key).await?))
}

pub async fn get_pokemons(
    State(repo): State<Arc<Repository>>,
    Path(offset): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<PokemonSummary>>, ApiError> {
    let offset: i64 = offset
        .parse()
        .map_err(|_| ApiError::BadRequest("offset must be a valid integer".to_string()))?;
    if offset < 0 {
        return Err(ApiError::BadRequest("offset cannot be negative".to_string()));
    }
    let offset = u32::try_from(offset)
        .map_err(|_| ApiError::BadRequest("offset is too large".to_string()))?;

    let limit: i64 = params
        .limit
        .as_deref()
        .unwrap_or("20")
        .parse()
        .map_err(|_| ApiError::BadRequest("limit must be a valid integer".to_string()))?;
    if limit <= 0 {
        return Err(ApiError::BadRequest("limit must be greater than 0".to_string()));
    }
    let limit = u32::try_from(limit)
        .map_err(|_| ApiError::BadRequest("limit is too large".to_string()))?;

    Ok(Json(repo.get_pokemons(offset, limit).await?))
}

pub async fn get_pokemon_detailed(
    State(repo): State<Arc<Repository>>,
    Path(id): Path<String>,
) -> Result<Json<PokemonDetailed>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("id must be a valid integer".to_string()))?;
    if id <= 0 {
        return Err(ApiError::BadRequest("id must be greater than 0".to_string()));
    }

    Ok(Json(repo.get_pokemon_detailed(PokemonId::new(id)).await?))
}
