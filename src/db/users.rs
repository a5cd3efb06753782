//! Queries against the `users` table.

use crate::db::pool::DatabasePool;
use crate::db::schema::{NewUser, UserPatch, UserRow};

/// Credential store: every account read and mutation goes through here.
#[derive(Debug, Clone)]
pub struct UserStore {
    db: DatabasePool,
}

impl UserStore {
    /// Creates a store over the given pool.
    #[must_use]
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    /// Finds the account matching `username`, `token`, and active
    /// status. This is the only lookup authorization uses.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub async fn find_active(
        &self,
        username: &str,
        token: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT username, token, status, privileged
            FROM users
            WHERE username = $1 AND token = $2 AND status = 'active'
            "#,
        )
        .bind(username)
        .bind(token)
        .fetch_optional(self.db.pool())
        .await
    }

    /// Whether an account with this username exists, active or not.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub async fn exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Inserts a new account.
    ///
    /// # Errors
    /// Returns error if the insert fails, including on a duplicate
    /// username.
    pub async fn insert(&self, user: &NewUser) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (username, token, status, privileged)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.username)
        .bind(&user.token)
        .bind(user.status)
        .bind(user.privileged)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Applies a partial update to the target account. Absent patch
    /// fields keep their stored value. Returns the number of rows
    /// touched; zero means the username does not exist.
    ///
    /// The caller is responsible for rejecting an empty patch before
    /// this point.
    ///
    /// # Errors
    /// Returns error if the update fails.
    pub async fn apply_patch(
        &self,
        username: &str,
        patch: &UserPatch,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                token = COALESCE($2, token),
                status = COALESCE($3, status),
                privileged = COALESCE($4, privileged)
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(patch.token.as_deref())
        .bind(patch.status)
        .bind(patch.privileged)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Replaces the token of the account matching both `username` and
    /// `current_token` exactly. Returns the number of rows touched; zero
    /// means no such pair exists.
    ///
    /// # Errors
    /// Returns error if the update fails.
    pub async fn rotate_token(
        &self,
        username: &str,
        current_token: &str,
        new_token: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET token = $3
            WHERE username = $1 AND token = $2
            "#,
        )
        .bind(username)
        .bind(current_token)
        .bind(new_token)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Lists accounts, restricted to one username when a filter is
    /// given. Rows include plaintext tokens.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub async fn list(&self, target_username: Option<&str>) -> Result<Vec<UserRow>, sqlx::Error> {
        match target_username {
            Some(username) => {
                sqlx::query_as(
                    r#"
                    SELECT username, token, status, privileged
                    FROM users
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_all(self.db.pool())
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT username, token, status, privileged
                    FROM users
                    ORDER BY username
                    "#,
                )
                .fetch_all(self.db.pool())
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{AccountStatus, Privilege};

    async fn store() -> UserStore {
        let db = DatabasePool::in_memory().await.expect("pool");
        db.bootstrap().await.expect("bootstrap");
        UserStore::new(db)
    }

    fn bob() -> NewUser {
        NewUser {
            username: "bob".to_string(),
            token: "t1".to_string(),
            status: AccountStatus::Active,
            privileged: Privilege::No,
        }
    }

    #[tokio::test]
    async fn test_find_active_matches_bootstrap_admin() {
        let store = store().await;

        let row = store
            .find_active("admin", "password")
            .await
            .expect("query")
            .expect("row");
        assert_eq!(row.privileged, Privilege::Yes);
        assert_eq!(row.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_find_active_rejects_wrong_token() {
        let store = store().await;

        let row = store.find_active("admin", "nope").await.expect("query");
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_find_active_rejects_inactive() {
        let store = store().await;
        store.insert(&bob()).await.expect("insert");
        store
            .apply_patch(
                "bob",
                &UserPatch {
                    status: Some(AccountStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .expect("patch");

        assert!(store.find_active("bob", "t1").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_errors() {
        let store = store().await;
        store.insert(&bob()).await.expect("first insert");

        assert!(store.insert(&bob()).await.is_err());
    }

    #[tokio::test]
    async fn test_patch_updates_only_supplied_fields() {
        let store = store().await;
        store.insert(&bob()).await.expect("insert");

        let rows = store
            .apply_patch(
                "bob",
                &UserPatch {
                    privileged: Some(Privilege::Yes),
                    ..Default::default()
                },
            )
            .await
            .expect("patch");
        assert_eq!(rows, 1);

        let row = store
            .find_active("bob", "t1")
            .await
            .expect("query")
            .expect("token untouched");
        assert_eq!(row.privileged, Privilege::Yes);
        assert_eq!(row.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_patch_missing_user_touches_nothing() {
        let store = store().await;

        let rows = store
            .apply_patch(
                "ghost",
                &UserPatch {
                    token: Some("t2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("patch");
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_rotate_token_requires_exact_match() {
        let store = store().await;
        store.insert(&bob()).await.expect("insert");

        assert_eq!(
            store.rotate_token("bob", "wrong", "t2").await.expect("query"),
            0
        );
        assert_eq!(
            store.rotate_token("bob", "t1", "t2").await.expect("query"),
            1
        );
        assert!(store.find_active("bob", "t2").await.expect("query").is_some());
    }

    #[tokio::test]
    async fn test_list_with_and_without_filter() {
        let store = store().await;
        store.insert(&bob()).await.expect("insert");

        let all = store.list(None).await.expect("list");
        assert_eq!(all.len(), 2);
        // Plaintext tokens come back with the rows.
        assert!(all.iter().any(|u| u.token == "password"));

        let filtered = store.list(Some("bob")).await.expect("list");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].username, "bob");

        let missing = store.list(Some("ghost")).await.expect("list");
        assert!(missing.is_empty());
    }
}
