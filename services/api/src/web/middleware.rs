//! services/api/src/web/middleware.rs
//!
//! Identity middleware for protecting routes.

use axum::{
    extract::Request,
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

/// Header carrying the authenticated user's id, set by the upstream auth proxy.
pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Middleware that reads the caller's user id and puts it into the request extensions.
///
/// A missing header is 401 Unauthorized, a malformed one is 400 Bad Request.
pub async fn require_user_id(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let raw = req
        .headers()
        .get(&USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let user_id = Uuid::parse_str(raw.trim()).map_err(|e| {
        warn!("Rejected malformed user id header: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
