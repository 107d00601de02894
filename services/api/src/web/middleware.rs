//! services/api/src/web/middleware.rs
//!
//! Identity middleware for routes that act on behalf of a user.
//!
//! Authentication itself is delegated to the hosted auth layer in front of
//! this service; requests arrive carrying the already-verified opaque user
//! id in the `x-user-id` header. This middleware only extracts it.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// The acting user's opaque id, inserted into request extensions for
/// handlers to pick up via `Extension<UserId>`.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

/// Middleware that requires the `x-user-id` header on mutating routes.
///
/// If present and non-empty, inserts a [`UserId`] into request extensions.
/// If missing or empty, returns 401 Unauthorized.
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    req.extensions_mut().insert(UserId(user_id));
    Ok(next.run(req).await)
}
