//! API module containing route handlers and router configuration.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
