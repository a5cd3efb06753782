//! Database connection pool management.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper.
///
/// Connections are acquired per query and released on every exit path by
/// sqlx's pool guard, including when the query itself fails.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from the connection string, creating
    /// the database file if it does not exist yet.
    ///
    /// # Arguments
    /// * `database_url` - SQLite connection string
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        info!("Database connection pool established");

        Ok(Self { pool })
    }

    /// Creates a pool over a private in-memory database.
    ///
    /// Restricted to a single connection: each SQLite in-memory
    /// connection is its own database, so a wider pool would not see a
    /// shared schema.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ensures the `users` table exists and holds the default admin
    /// account.
    ///
    /// # Errors
    /// Returns an error if either statement fails.
    pub async fn bootstrap(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                token TEXT NOT NULL,
                status TEXT NOT NULL,
                privileged TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (username, token, status, privileged)
            VALUES ('admin', 'password', 'active', 'yes')
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema bootstrapped");
        Ok(())
    }
}
