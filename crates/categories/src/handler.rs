use crate::models::RawCreateCategoryRequest;
use crate::service::{CategoryError, CategoryService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::{AppState, auth::CurrentUser};
use std::sync::Arc;
use serde_json::json;

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CategoryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            CategoryError::NotFound => (StatusCode::NOT_FOUND, "Category not found".to_string()),
            CategoryError::Infrastructure(e) => {
                tracing::error!("Category request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn categories_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .with_state(state)
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, CategoryError> {
    let categories = CategoryService::list_categories(&state.db, user_id).await?;
    Ok(Json(json!({ "categories": categories })))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<RawCreateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    let category = CategoryService::create_category(&state.db, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}
