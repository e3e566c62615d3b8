use crate::models::{LoginRequest, RawRegisterRequest};
use crate::service::{UserError, UserService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use common::{AppState, auth::{CurrentUser, end_session, start_session}, local_now};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            UserError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            UserError::Conflict => (StatusCode::CONFLICT, "Email is already registered".to_string()),
            UserError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()),
            UserError::Infrastructure(e) => {
                tracing::error!("Auth request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

fn session_failure(e: tower_sessions::session::Error) -> UserError {
    UserError::Infrastructure(format!("session store: {}", e))
}

/// Routes that work without a session.
pub fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RawRegisterRequest>,
) -> Result<impl IntoResponse, UserError> {
    let user = UserService::register(&state.db, payload, local_now()).await?;
    start_session(&session, user.id).await.map_err(session_failure)?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, UserError> {
    let user = UserService::login(&state.db, payload).await?;
    start_session(&session, user.id).await.map_err(session_failure)?;
    Ok(Json(json!({ "user": user })))
}

async fn logout(session: Session) -> Result<impl IntoResponse, UserError> {
    end_session(&session).await.map_err(session_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mounted behind the auth middleware.
pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, UserError> {
    let user = UserService::me(&state.db, user_id).await?;
    Ok(Json(json!({ "user": user })))
}
