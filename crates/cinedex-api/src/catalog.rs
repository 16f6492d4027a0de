use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use cinedex_types::models::{Director, Genre, Movie};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::run_blocking;

/// GET /
pub async fn welcome() -> &'static str {
    "Welcome to the Movie API!"
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /movies
pub async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<Movie>>> {
    let movies = run_blocking(&state, |s| Ok(s.store.list_movies()?)).await?;
    Ok(Json(movies))
}

/// GET /movies/{title}
pub async fn movie_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Json<Movie>> {
    let movie = run_blocking(&state, move |s| {
        s.store
            .find_movie_by_title(&title)?
            .ok_or(ApiError::MovieNotFound(title))
    })
    .await?;
    Ok(Json(movie))
}

/// GET /genres/{name}
pub async fn genre_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Genre>> {
    let genre = run_blocking(&state, move |s| {
        s.store
            .find_genre_by_name(&name)?
            .ok_or(ApiError::GenreNotFound(name))
    })
    .await?;
    Ok(Json(genre))
}

/// GET /directors/{name}
pub async fn director_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Director>> {
    let director = run_blocking(&state, move |s| {
        s.store
            .find_director_by_name(&name)?
            .ok_or(ApiError::DirectorNotFound(name))
    })
    .await?;
    Ok(Json(director))
}
