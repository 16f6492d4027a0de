use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};
use validator::ValidationErrors;

use cinedex_types::api::{FieldError, MessageResponse, ValidationErrorResponse};

use crate::password::HashError;

/// Why an authentication attempt failed. Every kind stays distinct here even
/// though the HTTP layer collapses most of them into one 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("no bearer token presented")]
    MissingToken,
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("token subject no longer exists")]
    UnknownSubject,
    #[error("store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("User \"{0}\" not found")]
    UserNotFound(String),
    #[error("Movie \"{0}\" not found")]
    MovieNotFound(String),
    #[error("Genre \"{0}\" not found")]
    GenreNotFound(String),
    #[error("Director \"{0}\" not found")]
    DirectorNotFound(String),
    #[error("Username \"{0}\" already exists")]
    DuplicateUsername(String),
    #[error("validation failed")]
    ValidationFailure(Vec<FieldError>),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::UserNotFound(_)
            | Self::MovieNotFound(_)
            | Self::GenreNotFound(_)
            | Self::DirectorNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateUsername(_) => StatusCode::BAD_REQUEST,
            Self::ValidationFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StoreUnavailable(_) | Self::Hash(_) | Self::Signing(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = wire_name(&field);
                errs.iter().map(move |err| FieldError {
                    field: field.clone(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::ValidationFailure(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}", self);
            return (
                status,
                Json(MessageResponse {
                    message: "Internal server error".into(),
                }),
            )
                .into_response();
        }

        match self {
            Self::ValidationFailure(errors) => {
                (status, Json(ValidationErrorResponse { errors })).into_response()
            }
            Self::Auth(AuthError::InvalidCredentials) => {
                debug!("Login rejected");
                (
                    status,
                    Json(MessageResponse {
                        message: "Incorrect username or password".into(),
                    }),
                )
                    .into_response()
            }
            Self::Auth(reason) => {
                debug!("Request rejected: {}", reason);
                (
                    status,
                    Json(MessageResponse {
                        message: "Unauthorized".into(),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(MessageResponse {
                    message: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Request bodies use PascalCase keys; report fields the way clients sent them.
fn wire_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
