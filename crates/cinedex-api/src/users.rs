use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use validator::Validate;

use cinedex_db::{NewUser, UpdateOutcome, UserChanges};
use cinedex_types::api::{DeregisterResponse, RegisterRequest, UpdateUserRequest};
use cinedex_types::models::User;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::CurrentUser;
use crate::run_blocking;

/// POST /users: create an account. Open to anonymous callers.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let user = run_blocking(&state, move |s| {
        if s.store.find_user_by_username(&req.username)?.is_some() {
            return Err(ApiError::DuplicateUsername(req.username));
        }

        let new_user = NewUser {
            password_hash: s.hasher.hash(&req.password)?,
            username: req.username,
            email: req.email,
            birthday: req.birthday,
        };

        // The UNIQUE constraint still catches a concurrent registration.
        s.store
            .create_user(&new_user)?
            .map(|stored| stored.into_public())
            .ok_or(ApiError::DuplicateUsername(new_user.username))
    })
    .await?;

    info!("Registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/{username}: overwrite the fields present in the body.
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(caller): Extension<CurrentUser>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let target = username.clone();
    let user = run_blocking(&state, move |s| {
        let password_hash = req
            .password
            .as_deref()
            .map(|p| s.hasher.hash(p))
            .transpose()?;
        let requested_name = req.username.clone();

        let changes = UserChanges {
            username: req.username,
            password_hash,
            email: req.email,
            birthday: req.birthday,
        };

        match s.store.update_user(&target, &changes)? {
            UpdateOutcome::Updated(user) => Ok(user.into_public()),
            UpdateOutcome::NotFound => Err(ApiError::UserNotFound(target)),
            UpdateOutcome::UsernameTaken => Err(ApiError::DuplicateUsername(
                requested_name.unwrap_or(target),
            )),
        }
    })
    .await?;

    info!("{} updated profile of {}", caller.username, username);
    Ok(Json(user))
}

/// DELETE /users/{username}: deregister; favorites go with the account.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(caller): Extension<CurrentUser>,
) -> ApiResult<Json<DeregisterResponse>> {
    let target = username.clone();
    let user = run_blocking(&state, move |s| {
        s.store
            .delete_user(&target)?
            .map(|stored| stored.into_public())
            .ok_or(ApiError::UserNotFound(target))
    })
    .await?;

    info!("{} deleted user {}", caller.username, username);
    Ok(Json(DeregisterResponse {
        message: format!("User \"{}\" has been deregistered", username),
        user,
    }))
}
