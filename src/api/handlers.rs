//! API request handlers.

use crate::db::{NewUser, UserPatch};
use crate::error::ApiError;
use crate::models::{
    AddUserRequest, AuthQuery, HealthResponse, StatusResponse, UpdateTokenRequest,
    UpdateUserRequest, UserCheckResponse, UserListQuery, UserListResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use std::sync::Arc;
use tracing::info;


// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Quotes
// ============================================================================

/// Get a quote for a ticker, served from the cache when fresh.
///
/// Privileged callers bypass the cache and force an upstream fetch.
#[utoipa::path(
    get,
    path = "/quote/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol, case-insensitive"),
        AuthQuery
    ),
    responses(
        (status = 200, description = "Quote payload from cache or upstream"),
        (status = 401, description = "Credentials rejected"),
        (status = 502, description = "Upstream fetch failed")
    ),
    tag = "Quotes"
)]
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(auth): Query<AuthQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let privilege = state
        .gate
        .authorize(&auth.username, &auth.token, false)
        .await?;
    let payload = state.quotes.get_quote(&ticker, privilege).await?;
    Ok(Json(payload))
}

// ============================================================================
// Credential Verification
// ============================================================================

/// Re-verify credentials directly against the store.
///
/// Always bypasses the user cache; a success refreshes it.
#[utoipa::path(
    get,
    path = "/user_check",
    params(AuthQuery),
    responses(
        (status = 200, description = "Caller's privilege level", body = UserCheckResponse),
        (status = 401, description = "Credentials rejected")
    ),
    tag = "Users"
)]
pub async fn user_check(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<AuthQuery>,
) -> Result<Json<UserCheckResponse>, ApiError> {
    let privilege = state
        .gate
        .authorize(&auth.username, &auth.token, true)
        .await?;
    Ok(Json(UserCheckResponse { status: privilege }))
}

// ============================================================================
// Admin Mutations
// ============================================================================

/// Patch an account's token, status, or privilege level.
#[utoipa::path(
    put,
    path = "/update_user",
    params(AuthQuery),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = StatusResponse),
        (status = 400, description = "No fields supplied"),
        (status = 401, description = "Admin credentials rejected"),
        (status = 404, description = "Target account not found")
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<AuthQuery>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.gate.verify_admin(&auth.username, &auth.token).await?;

    let patch = UserPatch {
        token: body.token,
        status: body.status,
        privileged: body.privileged,
    };
    if patch.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }

    let rows = state
        .store
        .apply_patch(&body.target_username, &patch)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;
    if rows == 0 {
        return Err(ApiError::NotFound(body.target_username));
    }

    info!(account = %body.target_username, "account updated");
    Ok(Json(StatusResponse::succeeded()))
}

/// Create a new account.
#[utoipa::path(
    post,
    path = "/add_user",
    params(AuthQuery),
    request_body = AddUserRequest,
    responses(
        (status = 200, description = "Account created", body = StatusResponse),
        (status = 401, description = "Admin credentials rejected"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Users"
)]
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<AuthQuery>,
    Json(body): Json<AddUserRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.gate.verify_admin(&auth.username, &auth.token).await?;

    let taken = state
        .store
        .exists(&body.target_username)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;
    if taken {
        return Err(ApiError::Conflict);
    }

    state
        .store
        .insert(&NewUser {
            username: body.target_username.clone(),
            token: body.token,
            status: body.status,
            privileged: body.privileged,
        })
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    info!(account = %body.target_username, "account created");
    Ok(Json(StatusResponse::succeeded()))
}

/// Rotate the caller's own token.
///
/// Authenticated by the current token alone; no admin check is applied
/// here.
#[utoipa::path(
    put,
    path = "/update_user_token",
    params(AuthQuery),
    request_body = UpdateTokenRequest,
    responses(
        (status = 200, description = "Token rotated", body = StatusResponse),
        (status = 401, description = "Username/current-token pair rejected")
    ),
    tag = "Users"
)]
pub async fn update_user_token(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<AuthQuery>,
    Json(body): Json<UpdateTokenRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let rows = state
        .store
        .rotate_token(&auth.username, &auth.token, &body.new_token)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;
    if rows == 0 {
        return Err(ApiError::Unauthorized);
    }

    info!(username = %auth.username, "token rotated");
    Ok(Json(StatusResponse::succeeded()))
}

/// List accounts, optionally filtered to one username.
///
/// Rows include plaintext tokens.
#[utoipa::path(
    get,
    path = "/user_list",
    params(AuthQuery, UserListQuery),
    responses(
        (status = 200, description = "Matching accounts", body = UserListResponse),
        (status = 401, description = "Admin credentials rejected")
    ),
    tag = "Users"
)]
pub async fn user_list(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<AuthQuery>,
    Query(filter): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    state.gate.verify_admin(&auth.username, &auth.token).await?;

    let users = state
        .store
        .list(filter.target_username.as_deref())
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;
    Ok(Json(UserListResponse { users }))
}
