use crate::error::BudgetError;
use crate::models::{RawCreateBudgetRequest, RawUpdateBudgetRequest};
use crate::service::BudgetService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use common::{AppState, auth::CurrentUser, local_now};
use std::sync::Arc;
use serde_json::json;

impl IntoResponse for BudgetError {
    fn into_response(self) -> Response {
        let status = match &self {
            BudgetError::InvalidPeriod(_) | BudgetError::Validation(_) => StatusCode::BAD_REQUEST,
            BudgetError::DuplicateBudget => StatusCode::CONFLICT,
            BudgetError::NotFound => StatusCode::NOT_FOUND,
            BudgetError::StoreUnavailable(e) => {
                tracing::error!("Budget status unavailable: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Transaction store unavailable" })),
                )
                    .into_response();
            }
            BudgetError::Infrastructure(e) => {
                tracing::error!("Budget request failed: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn budgets_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_budgets).post(create_budget))
        .route("/{id}", put(update_budget).delete(delete_budget))
        .with_state(state)
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, BudgetError> {
    let budgets = BudgetService::list_budgets(&state.db, &state.db, user_id).await?;
    Ok(Json(json!({ "budgets": budgets })))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<RawCreateBudgetRequest>,
) -> Result<impl IntoResponse, BudgetError> {
    let budget = BudgetService::create_budget(&state.db, user_id, payload, local_now()).await?;
    let budget = BudgetService::with_category(&state.db, user_id, budget).await?;
    Ok((StatusCode::CREATED, Json(json!({ "budget": budget }))))
}

async fn update_budget(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RawUpdateBudgetRequest>,
) -> Result<impl IntoResponse, BudgetError> {
    let budget = BudgetService::update_budget(&state.db, user_id, id, payload).await?;
    let budget = BudgetService::with_category(&state.db, user_id, budget).await?;
    Ok(Json(json!({ "budget": budget })))
}

async fn delete_budget(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, BudgetError> {
    BudgetService::delete_budget(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
