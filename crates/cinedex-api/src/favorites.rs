use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use cinedex_db::CatalogStore;
use cinedex_types::api::FavoritesResponse;
use cinedex_types::models::Movie;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::run_blocking;

/// The movie a favorites change concerned and the user's set afterwards.
#[derive(Debug)]
pub struct FavoritesUpdate {
    pub movie: Movie,
    pub favorite_movies: Vec<String>,
}

/// Adds and removes movies in a user's favorite set.
///
/// Both operations are a single set-union/set-difference at the store, so
/// repeating a call is harmless and concurrent calls for the same user do not
/// overwrite each other.
pub struct FavoritesManager<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> FavoritesManager<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Add `movie_id` if absent. Adding an existing favorite succeeds and
    /// returns the unchanged set.
    pub fn add(&self, username: &str, movie_id: &str) -> ApiResult<FavoritesUpdate> {
        let movie = self.check(username, movie_id)?;
        let favorite_movies = self
            .store
            .add_favorite(username, movie_id)?
            .ok_or_else(|| ApiError::UserNotFound(username.to_string()))?;
        Ok(FavoritesUpdate { movie, favorite_movies })
    }

    /// Remove `movie_id` if present. Removing a movie that was never a
    /// favorite succeeds and returns the unchanged set.
    pub fn remove(&self, username: &str, movie_id: &str) -> ApiResult<FavoritesUpdate> {
        let movie = self.check(username, movie_id)?;
        let favorite_movies = self
            .store
            .remove_favorite(username, movie_id)?
            .ok_or_else(|| ApiError::UserNotFound(username.to_string()))?;
        Ok(FavoritesUpdate { movie, favorite_movies })
    }

    fn check(&self, username: &str, movie_id: &str) -> ApiResult<Movie> {
        if self.store.find_user_by_username(username)?.is_none() {
            return Err(ApiError::UserNotFound(username.to_string()));
        }
        self.store
            .find_movie_by_id(movie_id)?
            .ok_or_else(|| ApiError::MovieNotFound(movie_id.to_string()))
    }
}

/// POST /users/{username}/favorites/{movie_id}
pub async fn add_favorite(
    State(state): State<AppState>,
    Path((username, movie_id)): Path<(String, String)>,
    Extension(caller): Extension<CurrentUser>,
) -> ApiResult<Json<FavoritesResponse>> {
    let (user, movie) = (username.clone(), movie_id.clone());
    let update = run_blocking(&state, move |s| {
        FavoritesManager::new(s.store.as_ref()).add(&user, &movie)
    })
    .await?;

    info!("{} favorited {} for {}", caller.username, movie_id, username);
    Ok(Json(FavoritesResponse {
        message: format!(
            "Movie \"{}\" added to {}'s favorites",
            update.movie.title, username
        ),
        favorite_movies: update.favorite_movies,
    }))
}

/// DELETE /users/{username}/favorites/{movie_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((username, movie_id)): Path<(String, String)>,
    Extension(caller): Extension<CurrentUser>,
) -> ApiResult<Json<FavoritesResponse>> {
    let (user, movie) = (username.clone(), movie_id.clone());
    let update = run_blocking(&state, move |s| {
        FavoritesManager::new(s.store.as_ref()).remove(&user, &movie)
    })
    .await?;

    info!("{} unfavorited {} for {}", caller.username, movie_id, username);
    Ok(Json(FavoritesResponse {
        message: format!(
            "Movie \"{}\" removed from {}'s favorites",
            update.movie.title, username
        ),
        favorite_movies: update.favorite_movies,
    }))
}
