use axum::{middleware, routing::get, Router};
use common::{AppState, auth::auth_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

/// Full application router. Everything under `/api` except the auth
/// endpoints requires a signed-in session.
pub fn build_router(state: Arc<AppState>, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    let protected_routes = Router::<Arc<AppState>>::new()
        .route("/api/auth/me", get(users::handler::me))
        .nest("/api/categories", categories::handler::categories_router(state.clone()))
        .nest("/api/transactions", transactions::handler::transactions_router(state.clone()))
        .nest("/api/budgets", budgets::handler::budgets_router(state.clone()))
        .layer(middleware::from_fn(auth_middleware));

    Router::<Arc<AppState>>::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/auth", users::handler::auth_router(state.clone()))
        .merge(protected_routes)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
