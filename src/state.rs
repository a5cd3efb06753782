//! Application state management.

use crate::auth::AuthGate;
use crate::config::Config;
use crate::db::{DatabasePool, UserStore};
use crate::quotes::QuoteFetcher;

/// Application state shared across all handlers.
///
/// Constructed once at startup; the caches inside the gate and the
/// fetcher live for the life of the process and vanish on restart.
#[derive(Debug)]
pub struct AppState {
    /// Authorization gate with the user cache.
    pub gate: AuthGate,
    /// Credential store for admin mutations.
    pub store: UserStore,
    /// Upstream fetcher with the quote cache.
    pub quotes: QuoteFetcher,
}

impl AppState {
    /// Wires the state from configuration and an established pool.
    ///
    /// # Errors
    /// Returns error if the upstream HTTP client cannot be built.
    pub fn new(config: &Config, db: DatabasePool) -> Result<Self, reqwest::Error> {
        let store = UserStore::new(db);
        let gate = AuthGate::new(
            store.clone(),
            config.user_cache_ttl(),
            config.cache_capacity,
        );
        let quotes = QuoteFetcher::new(
            &config.upstream_url,
            &config.upstream_token,
            config.quote_cache_ttl(),
            config.cache_capacity,
        )?;

        Ok(Self {
            gate,
            store,
            quotes,
        })
    }
}
