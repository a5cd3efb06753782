//! Request/response DTOs with OpenAPI schemas.

use crate::db::{AccountStatus, Privilege, UserRow};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Caller credentials, carried as query parameters on every
/// authenticated route.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AuthQuery {
    /// Account name.
    pub username: String,
    /// Shared-secret token.
    pub token: String,
}

/// Optional account filter for `/user_list`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Restrict the listing to one username.
    pub target_username: Option<String>,
}

/// Body for `PUT /update_user`: a patch where every field is
/// independently optional. Supplying none of them is a validation
/// error.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Account to patch.
    pub target_username: String,
    /// Replacement token.
    pub token: Option<String>,
    /// Replacement status.
    pub status: Option<AccountStatus>,
    /// Replacement privilege level.
    pub privileged: Option<Privilege>,
}

/// Body for `POST /add_user`; all fields required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddUserRequest {
    /// Account to create.
    pub target_username: String,
    /// Initial token.
    pub token: String,
    /// Initial status.
    pub status: AccountStatus,
    /// Initial privilege level.
    pub privileged: Privilege,
}

/// Body for `PUT /update_user_token`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTokenRequest {
    /// Token to rotate to.
    pub new_token: String,
}

/// Success body for mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always `"succeeded"`.
    pub status: String,
}

impl StatusResponse {
    /// The one success shape every mutation returns.
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            status: "succeeded".to_string(),
        }
    }
}

/// Response for `/user_check`: the caller's privilege level.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserCheckResponse {
    /// `"yes"` or `"no"`.
    pub status: Privilege,
}

/// Response for `/user_list`. Rows include plaintext tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// Matching account rows.
    pub users: Vec<UserRow>,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}
