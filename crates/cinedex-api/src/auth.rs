use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{debug, info};

use cinedex_db::CatalogStore;
use cinedex_types::api::{LoginRequest, LoginResponse};

use crate::authenticator::{Authenticator, Credentials, PasswordAuthenticator};
use crate::error::{ApiResult, AuthError};
use crate::password::PasswordHasher;
use crate::run_blocking;
use crate::token::TokenKeys;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn CatalogStore>,
    pub tokens: TokenKeys,
    pub hasher: PasswordHasher,
}

/// POST /login: verify the password and hand back the user with a fresh token.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    // A body without both credentials is a failed login, not a form error.
    let Json(req) = body.map_err(|rejection| {
        debug!("Unreadable login body: {}", rejection.body_text());
        AuthError::InvalidCredentials
    })?;

    let response = run_blocking(&state, move |s| {
        let user = PasswordAuthenticator::new(s.store.as_ref(), &s.hasher)
            .authenticate(Credentials {
                username: req.username,
                password: req.password,
            })?
            .into_public();

        let token = s.tokens.issue(&user)?;
        Ok(LoginResponse { user, token })
    })
    .await?;

    info!("User {} logged in", response.user.username);
    Ok(Json(response))
}
