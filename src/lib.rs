//! # Quote Gateway - Caching Stock Quote Proxy
//!
//! A small HTTP gateway that proxies stock-quote lookups to an upstream
//! financial-data API, shielding callers behind a short-lived in-memory
//! cache and a username/token authorization table stored in a relational
//! database. Built with [Axum](https://crates.io/crates/axum) for async
//! HTTP handling and provides OpenAPI/Swagger documentation via
//! [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Two-tier TTL cache**: quote payloads and user privilege levels are
//!   cached independently, each with its own time-to-live and a bounded
//!   capacity with oldest-first eviction.
//!
//! - **Token authorization**: every quote request is checked against a
//!   `users` table; privileged accounts bypass the quote cache and force
//!   a fresh upstream fetch.
//!
//! - **Admin account management**: endpoints for creating, updating, and
//!   listing accounts, guarded by a direct credential check against the
//!   store.
//!
//! - **OpenAPI Documentation**: auto-generated Swagger UI for API
//!   exploration and testing at `/swagger-ui/`.
//!
//! - **Structured Logging**: request tracing with `tower-http` for
//!   debugging and monitoring.
//!
//! ## Request Flow
//!
//! ```text
//! GET /quote/{ticker}
//!   └── Authorization Gate ── user cache ──> credential store (on miss)
//!         └── Quote Cache (bypassed for privileged callers)
//!               └── upstream quote API (on miss) ──> cache write-back
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers and router configuration |
//! | [`auth`] | Authorization gate backed by the user cache |
//! | [`cache`] | Bounded TTL cache used for quotes and privileges |
//! | [`config`] | Environment-driven configuration |
//! | [`db`] | Connection pool, schema bootstrap, and user queries |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`quotes`] | Upstream quote fetcher and quote cache |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/health` | none | Health check |
//! | GET | `/quote/{ticker}` | username+token | Cached or fresh quote JSON |
//! | GET | `/user_check` | username+token | Re-verify credentials against the store |
//! | PUT | `/update_user` | admin | Patch an account's token/status/privilege |
//! | POST | `/add_user` | admin | Create an account |
//! | PUT | `/update_user_token` | username+current token | Rotate the caller's token |
//! | GET | `/user_list` | admin | List accounts, optionally filtered |
//!
//! ## Example Usage
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # With custom host/port and upstream key
//! HOST=127.0.0.1 PORT=3000 BRAPI_TOKEN=my_key cargo run
//!
//! # Fetch a quote (bootstrap creates admin/password)
//! curl 'http://localhost:8080/quote/PETR4?username=admin&token=password'
//!
//! # Create a non-privileged account
//! curl -X POST 'http://localhost:8080/add_user?username=admin&token=password' \
//!   -H "Content-Type: application/json" \
//!   -d '{"target_username": "bob", "token": "t1", "status": "active", "privileged": "no"}'
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod quotes;
pub mod state;
