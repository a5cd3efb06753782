//! Authorization gate: credential checks backed by the user cache.

use crate::cache::TtlCache;
use crate::db::{Privilege, UserStore};
use crate::error::ApiError;
use std::time::Duration;
use tracing::warn;

/// Username required for administrative mutations.
const ADMIN_USERNAME: &str = "admin";

/// Validates (username, token) pairs against the credential store,
/// keeping a TTL-bounded cache of username → privilege in front of it.
///
/// Known quirk: the cache is keyed by username alone, so once a
/// privilege is cached, any token presented for that username is
/// accepted until the entry expires. `authorize` with `force_refresh`
/// skips the cache and re-verifies against the store.
#[derive(Debug)]
pub struct AuthGate {
    store: UserStore,
    cache: TtlCache<String, Privilege>,
}

impl AuthGate {
    /// Creates a gate over the given store with the given user-cache
    /// parameters.
    #[must_use]
    pub fn new(store: UserStore, ttl: Duration, capacity: usize) -> Self {
        Self {
            store,
            cache: TtlCache::new(ttl, capacity),
        }
    }

    /// Resolves the caller's privilege level.
    ///
    /// With `force_refresh` false, a live cache entry for `username`
    /// short-circuits the store lookup; the supplied token is not
    /// re-checked on that path. Otherwise the store is queried for an
    /// active row matching both username and token, and a hit refreshes
    /// the cache.
    ///
    /// Store failures are logged and reported as `Unauthorized`.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthorized`] when no active matching row
    /// exists or the store cannot be reached.
    pub async fn authorize(
        &self,
        username: &str,
        token: &str,
        force_refresh: bool,
    ) -> Result<Privilege, ApiError> {
        if !force_refresh
            && let Some(privilege) = self.cache.get(&username.to_string())
        {
            return Ok(privilege);
        }

        let row = self
            .store
            .find_active(username, token)
            .await
            .map_err(|e| {
                warn!(username, error = %e, "credential lookup failed");
                ApiError::Unauthorized
            })?;

        match row {
            Some(user) => {
                self.cache.insert(username.to_string(), user.privileged);
                Ok(user.privileged)
            }
            None => Err(ApiError::Unauthorized),
        }
    }

    /// Verifies administrative credentials for a mutation.
    ///
    /// Always queries the store directly, never the cache, and requires
    /// the caller to be the `admin` account with an active matching row.
    /// Unlike [`authorize`](Self::authorize), store failures surface as
    /// [`ApiError::Database`] so mutation responses carry the cause.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthorized`] on a credential mismatch, or
    /// [`ApiError::Database`] if the store query fails.
    pub async fn verify_admin(&self, username: &str, token: &str) -> Result<(), ApiError> {
        if username != ADMIN_USERNAME {
            return Err(ApiError::Unauthorized);
        }

        let row = self
            .store
            .find_active(username, token)
            .await
            .map_err(|e| ApiError::Database(e.to_string()))?;

        match row {
            Some(_) => Ok(()),
            None => Err(ApiError::Unauthorized),
        }
    }
}
