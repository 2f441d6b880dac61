use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

pub const USER_ID_HEADER: &str = "X-User-Id";

fn header_user_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Required user identity. Rejects the request with 401 when the
/// X-User-Id header is missing.
#[derive(Debug)]
pub struct UserId(pub String);

pub struct MissingUserId;

impl IntoResponse for MissingUserId {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Missing X-User-Id header" })),
        )
            .into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = MissingUserId;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_user_id(parts).map(UserId).ok_or(MissingUserId)
    }
}

/// Optional user identity for endpoints that also serve anonymous callers.
#[derive(Debug)]
pub struct MaybeUserId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUserId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUserId(header_user_id(parts)))
    }
}
