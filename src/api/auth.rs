// src/api/auth.rs — Optional shared-secret check for the executor API
//
// `[api] token` unset means the executor trusts its network and every route is
// open. When set, run and metrics routes need `Authorization: Bearer <token>`.
// `/health` never calls this.

use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;

use crate::api::{types::ErrorResponse, ApiState};

pub fn check_auth(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(());
    };

    match bearer_token(headers) {
        Some(presented) if tokens_match(presented, expected) => Ok(()),
        Some(_) => Err(unauthorized("bearer token rejected")),
        None => Err(unauthorized("missing bearer token")),
    }
}

/// Token from an `Authorization: Bearer` header. Other schemes count as absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Compares every byte regardless of where the first mismatch is.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, "unauthorized")),
    )
}
