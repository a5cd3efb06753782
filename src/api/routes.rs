//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Quotes
        .route("/quote/{ticker}", get(handlers::get_quote))
        // Credential verification
        .route("/user_check", get(handlers::user_check))
        // Admin mutations
        .route("/update_user", put(handlers::update_user))
        .route("/add_user", post(handlers::add_user))
        .route("/user_list", get(handlers::user_list))
        // Token rotation (authenticated by the current token itself)
        .route("/update_user_token", put(handlers::update_user_token))
        .with_state(state)
}
