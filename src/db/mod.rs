//! Database layer: connection pooling, schema bootstrap, and user queries.

pub mod pool;
pub mod schema;
pub mod users;

pub use pool::DatabasePool;
pub use schema::{AccountStatus, NewUser, Privilege, UserPatch, UserRow};
pub use users::UserStore;
