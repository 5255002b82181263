//! SQLite session backend.

use std::time::{SystemTime, UNIX_EPOCH};

use {async_trait::async_trait, sqlx::sqlite::SqlitePoolOptions};

use crate::{
    Result, Session,
    backend::SessionBackend,
    error::Context,
};

/// Stores each session as a JSON document keyed by user id.
pub struct SqliteSessionBackend {
    pool: sqlx::SqlitePool,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

impl SqliteSessionBackend {
    /// Wrap an existing pool. The caller runs migrations.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Open `database_url` and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await?;
        crate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Number of stored sessions.
    pub async fn count(&self) -> Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_sessions")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[async_trait]
impl SessionBackend for SqliteSessionBackend {
    async fn get(&self, user_id: &str) -> Result<Option<Session>> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT session FROM user_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        raw.map(|raw| {
            serde_json::from_str::<Session>(&raw)
                .with_context(|| format!("corrupt session for user {user_id}"))
        })
        .transpose()
    }

    async fn put(&self, user_id: &str, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        sqlx::query(
            r#"INSERT INTO user_sessions (user_id, session, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                 session = excluded.session,
                 updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(raw)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
