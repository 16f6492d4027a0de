use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use uuid::Uuid;

use crate::auth::AppState;
use crate::authenticator::{Authenticator, BearerToken, TokenAuthenticator};
use crate::error::{ApiResult, AuthError};
use crate::run_blocking;

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

/// Extract and validate the bearer token from the Authorization header.
/// Every failure kind becomes the same 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
        .ok_or(AuthError::MissingToken)?;

    let user = run_blocking(&state, move |s| {
        Ok(TokenAuthenticator::new(s.store.as_ref(), &s.tokens).authenticate(BearerToken(token))?)
    })
    .await?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}
