mod handlers;
mod models;
mod page;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use handlers::{ask, health, index, not_found, submit};
pub use models::{AskRequest, AskResponse, ChatForm, ErrorResponse, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
