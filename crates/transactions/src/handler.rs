use crate::models::RawTransactionRequest;
use crate::service::{TransactionError, TransactionService};
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

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            TransactionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            TransactionError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_string()),
            TransactionError::Infrastructure(e) => {
                tracing::error!("Transaction request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn transactions_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/{id}", put(update_transaction).delete(delete_transaction))
        .with_state(state)
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, TransactionError> {
    let transactions = TransactionService::list_transactions(&state.db, user_id).await?;
    let transactions = TransactionService::with_categories(&state.db, user_id, transactions).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<RawTransactionRequest>,
) -> Result<impl IntoResponse, TransactionError> {
    let transaction = TransactionService::create_transaction(&state.db, user_id, payload, local_now()).await?;
    let transaction = TransactionService::with_category(&state.db, user_id, transaction).await?;
    Ok((StatusCode::CREATED, Json(json!({ "transaction": transaction }))))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RawTransactionRequest>,
) -> Result<impl IntoResponse, TransactionError> {
    let transaction = TransactionService::update_transaction(&state.db, user_id, id, payload).await?;
    let transaction = TransactionService::with_category(&state.db, user_id, transaction).await?;
    Ok(Json(json!({ "transaction": transaction })))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::delete_transaction(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
