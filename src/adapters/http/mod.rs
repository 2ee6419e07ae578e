//! HTTP adapters: thin axum layer over the application handlers.

pub mod family;
pub mod member;
pub mod middleware;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use crate::domain::member::MemberError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Builds a plain error body.
pub fn error_body(code: &str, message: impl Into<String>) -> ErrorBody {
    ErrorBody {
        code: code.to_string(),
        message: message.into(),
        field: None,
    }
}

/// Maps a member engine error onto the HTTP taxonomy.
pub(crate) fn member_error_response(error: MemberError) -> Response {
    let status = match &error {
        MemberError::NotFound(_) => StatusCode::NOT_FOUND,
        MemberError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        MemberError::DuplicateChild { .. }
        | MemberError::SelfReference(_)
        | MemberError::Conflict(_) => StatusCode::CONFLICT,
        MemberError::Forbidden => StatusCode::FORBIDDEN,
        MemberError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let field = match &error {
        MemberError::ValidationFailed { field, .. } => Some(field.clone()),
        _ => None,
    };

    let body = ErrorBody {
        code: error.code().to_string(),
        message: error.message(),
        field,
    };
    (status, Json(body)).into_response()
}
