//! Database schema types for the `users` table.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Whether an account may authenticate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account accepted for authorization.
    Active,
    /// Account rejected regardless of token.
    Inactive,
}

/// Privilege level of an account.
///
/// Privileged ("yes") accounts bypass the quote cache and force a fresh
/// upstream fetch on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Privilege {
    /// Privileged: quote cache is bypassed.
    Yes,
    /// Not privileged: quote cache is consulted first.
    No,
}

impl Privilege {
    /// Whether this level grants the quote-cache bypass.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(self, Privilege::Yes)
    }
}

/// A full account row from the `users` table.
///
/// Serialized as-is by `/user_list`, token included.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserRow {
    /// Unique account name.
    pub username: String,
    /// Shared-secret token, stored and returned in plaintext.
    pub token: String,
    /// Account status.
    pub status: AccountStatus,
    /// Privilege level.
    pub privileged: Privilege,
}

/// Field set for creating an account; nothing is optional.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique account name.
    pub username: String,
    /// Shared-secret token.
    pub token: String,
    /// Account status.
    pub status: AccountStatus,
    /// Privilege level.
    pub privileged: Privilege,
}

/// Structured patch for `update_user`; each field independently
/// optional, translated to a single parameterized UPDATE.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    /// Replacement token, if any.
    pub token: Option<String>,
    /// Replacement status, if any.
    pub status: Option<AccountStatus>,
    /// Replacement privilege level, if any.
    pub privileged: Option<Privilege>,
}

impl UserPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.status.is_none() && self.privileged.is_none()
    }
}
