use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{catalog, favorites, users};

/// All routes. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(catalog::welcome))
        .route("/health", get(catalog::health))
        .route("/login", post(auth::login))
        .route("/users", post(users::register));

    let protected_routes = Router::new()
        .route(
            "/users/{username}",
            put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/users/{username}/favorites/{movie_id}",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/movies", get(catalog::list_movies))
        .route("/movies/{title}", get(catalog::movie_by_title))
        .route("/genres/{name}", get(catalog::genre_by_name))
        .route("/directors/{name}", get(catalog::director_by_name))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
