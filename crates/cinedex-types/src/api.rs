use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::User;

// -- JWT Claims --

/// Claims carried by every bearer token. `iat` and `exp` are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

// -- Users --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 5, message = "Username must be at least 5 characters long"))]
    #[validate(custom(
        function = "alphanumeric",
        message = "Username contains non alphanumeric characters - not allowed"
    ))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(email(message = "Email does not appear to be valid"))]
    pub email: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 5, message = "Username must be at least 5 characters long"))]
    #[validate(custom(
        function = "alphanumeric",
        message = "Username contains non alphanumeric characters - not allowed"
    ))]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: Option<String>,
    #[validate(email(message = "Email does not appear to be valid"))]
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FavoritesResponse {
    #[serde(rename = "message")]
    pub message: String,
    pub favorite_movies: Vec<String>,
}

/// Reply to a deregistration: what was removed, favorites included.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeregisterResponse {
    pub message: String,
    pub user: User,
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn alphanumeric(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumeric"))
    }
}
