use axum::extract::{FromRequest, rejection::JsonRejection};

use cinedex_types::api::FieldError;

use crate::error::ApiError;

/// JSON request body whose rejections are answered as [`ApiError`], so a
/// missing or ill-typed field gets the same 422 field list as a failed check.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationFailure(vec![body_field_error(&rejection.body_text())])
    }
}

/// Name the offending field from a body rejection message. Anything that is
/// not about one field (bad syntax, wrong content type) is reported as `Body`.
fn body_field_error(text: &str) -> FieldError {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, rest)| rest);

    if let Some((_, rest)) = detail.split_once("missing field `") {
        let field = rest.split('`').next().unwrap_or_default();
        return FieldError {
            field: field.to_string(),
            message: format!("{field} is required"),
        };
    }

    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            let field = path.split(['.', '[']).next().unwrap_or(path);
            FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }
        }
        _ => FieldError {
            field: "Body".into(),
            message: detail.to_string(),
        },
    }
}
