use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;
use crate::UserId;

/// Session key holding the authenticated user's id. The cookie itself only
/// carries the opaque session id; the mapping lives server-side.
pub const USER_SESSION_KEY: &str = "user_id";

/// The authenticated user, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not signed in" }))).into_response()
}

pub async fn auth_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match session.get::<UserId>(USER_SESSION_KEY).await {
        Ok(Some(user_id)) => {
            request.extensions_mut().insert(CurrentUser(user_id));
            next.run(request).await
        }
        Ok(None) => unauthorized(),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(unauthorized)
    }
}

/// Binds the session to `user_id`, rotating the session id first so a
/// pre-login id cannot be reused.
pub async fn start_session(session: &Session, user_id: UserId) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_SESSION_KEY, user_id).await
}

pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
