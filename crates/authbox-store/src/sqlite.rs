use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StoreError;

/// One extracted code record, as listed for the admin view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CodeMail {
    pub from_addr: String,
    pub from_org: String,
    pub to_addr: String,
    pub code: String,
    pub topic: String,
    pub message_id: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the `SQLite` database and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let opts = SqliteConnectOptions::from_str(&url)
            .map_err(StoreError::Open)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(StoreError::Open)?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Expose the underlying pool for shared access.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record an inbound message verbatim. Always the first write of an
    /// invocation, so an audit row exists whatever extraction does later.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_raw_mail(
        &self,
        from: &str,
        to: &str,
        raw: &str,
        message_id: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO raw_mails (from_addr, to_addr, raw, message_id) VALUES (?, ?, ?, ?)")
            .bind(from)
            .bind(to)
            .bind(raw)
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record one extracted code.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_code_mail(
        &self,
        from: &str,
        org: &str,
        to: &str,
        code: &str,
        topic: &str,
        message_id: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO code_mails (from_addr, from_org, to_addr, code, topic, message_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(from)
        .bind(org)
        .bind(to)
        .bind(code)
        .bind(topic)
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All code mails, newest first. `id` breaks ties within the one-second
    /// resolution of `CURRENT_TIMESTAMP`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_code_mails(&self) -> Result<Vec<CodeMail>, StoreError> {
        let rows = sqlx::query_as::<_, CodeMail>(
            "SELECT from_addr, from_org, to_addr, code, topic, message_id, created_at \
             FROM code_mails ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authbox.db");
        let store = SqliteStore::new(path.to_str().unwrap()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn open_creates_database_and_tables() {
        let (store, _dir) = test_store().await;
        assert!(store.list_code_mails().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_raw_mail_with_and_without_message_id() {
        let (store, _dir) = test_store().await;
        store
            .insert_raw_mail("a@x.com", "b@y.com", "raw body", Some("<id1>"))
            .await
            .unwrap();
        store
            .insert_raw_mail("a@x.com", "b@y.com", "raw body", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn insert_and_list_code_mail_round_trip() {
        let (store, _dir) = test_store().await;
        store
            .insert_code_mail(
                "noreply@netflix.com",
                "Netflix",
                "me@example.com",
                "123456",
                "login verification",
                Some("<m1>"),
            )
            .await
            .unwrap();

        let rows = store.list_code_mails().await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.from_addr, "noreply@netflix.com");
        assert_eq!(row.from_org, "Netflix");
        assert_eq!(row.to_addr, "me@example.com");
        assert_eq!(row.code, "123456");
        assert_eq!(row.topic, "login verification");
        assert_eq!(row.message_id.as_deref(), Some("<m1>"));
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let (store, _dir) = test_store().await;
        for n in 0..3 {
            store
                .insert_code_mail("f", &format!("org-{n}"), "t", "c", "topic", None)
                .await
                .unwrap();
        }

        let rows = store.list_code_mails().await.unwrap();
        let orgs: Vec<&str> = rows.iter().map(|r| r.from_org.as_str()).collect();
        assert_eq!(orgs, ["org-2", "org-1", "org-0"]);
    }

    #[tokio::test]
    async fn reopen_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authbox.db");
        {
            let store = SqliteStore::new(path.to_str().unwrap()).await.unwrap();
            store
                .insert_code_mail("f", "Org", "t", "c", "topic", None)
                .await
                .unwrap();
        }
        let store = SqliteStore::new(path.to_str().unwrap()).await.unwrap();
        assert_eq!(store.list_code_mails().await.unwrap().len(), 1);
    }
}
