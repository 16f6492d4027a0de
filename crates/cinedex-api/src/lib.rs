pub mod auth;
pub mod authenticator;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod favorites;
pub mod middleware;
pub mod password;
pub mod router;
pub mod token;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use router::router;

use tracing::error;

use crate::error::ApiError;

/// Run store access, hashing and token checks off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&*state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::from(e)
        })?
}
