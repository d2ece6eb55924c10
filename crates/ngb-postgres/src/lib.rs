//! PostgreSQL score store (sqlx).
//!
//! This crate implements the `ngb-core` ScoreStore over a single `users` table.
//! A best score of `0` (the column default) or `NULL` means "never won".

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};

use ngb_core::{
    config::DatabaseConfig,
    domain::UserId,
    errors::Error,
    scores::{LeaderboardEntry, ScoreStore},
    Result,
};

const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id BIGINT PRIMARY KEY,
        name TEXT,
        best_score INTEGER DEFAULT 0
    )";

const UPSERT_USER: &str = "
    INSERT INTO users (user_id, name)
    VALUES ($1, $2)
    ON CONFLICT (user_id) DO UPDATE
    SET name = EXCLUDED.name";

// Compare-and-lower in one statement; no row is touched when the new count is not better.
const RECORD_ATTEMPTS: &str = "
    UPDATE users
    SET best_score = $2
    WHERE user_id = $1
      AND (best_score IS NULL OR best_score <= 0 OR best_score > $2)";

const SELECT_BEST_SCORE: &str = "SELECT best_score FROM users WHERE user_id = $1";

const SELECT_LEADERBOARD: &str = "
    SELECT name, best_score
    FROM users
    WHERE best_score > 0
    ORDER BY best_score ASC
    LIMIT $1";

#[derive(Clone, Debug)]
pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    /// Open a pool for `cfg`. Connections are acquired per query and returned afterwards.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self> {
        let ssl_mode = PgSslMode::from_str(&cfg.ssl_mode)
            .map_err(|e| Error::Config(format!("invalid DATABASE_SSL_MODE: {e}")))?;
        let options = PgConnectOptions::from_str(&cfg.url)
            .map_err(|e| Error::Config(format!("invalid DATABASE_URL: {e}")))?
            .ssl_mode(ssl_mode);

        tracing::info!(
            max_connections = cfg.max_connections,
            acquire_timeout_ms = cfg.acquire_timeout.as_millis() as u64,
            ssl_mode = %cfg.ssl_mode,
            "connecting to postgres"
        );

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(map_err)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        tracing::info!("database schema ready");
        Ok(())
    }
}

fn map_err(e: sqlx::Error) -> Error {
    Error::Storage(format!("postgres error: {e}"))
}

/// Stored values `<= 0` are the "unset" sentinel.
fn positive_score(raw: Option<i32>) -> Option<u32> {
    raw.filter(|v| *v > 0).map(|v| v as u32)
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn upsert_user(&self, user_id: UserId, name: &str) -> Result<()> {
        sqlx::query(UPSERT_USER)
            .bind(user_id.0)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn record_attempt_count(&self, user_id: UserId, attempts: u32) -> Result<()> {
        let attempts = i32::try_from(attempts).unwrap_or(i32::MAX);
        let res = sqlx::query(RECORD_ATTEMPTS)
            .bind(user_id.0)
            .bind(attempts)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if res.rows_affected() > 0 {
            tracing::info!(user_id = user_id.0, attempts, "new best score");
        }
        Ok(())
    }

    async fn best_score(&self, user_id: UserId) -> Result<Option<u32>> {
        let row: Option<(Option<i32>,)> = sqlx::query_as(SELECT_BEST_SCORE)
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(row.and_then(|(best,)| positive_score(best)))
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(Option<String>, i32)> = sqlx::query_as(SELECT_LEADERBOARD)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, best)| {
                positive_score(Some(best)).map(|best_score| LeaderboardEntry {
                    name: name.unwrap_or_default(),
                    best_score,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_scores_mean_unset() {
        assert_eq!(positive_score(None), None);
        assert_eq!(positive_score(Some(0)), None);
        assert_eq!(positive_score(Some(-3)), None);
        assert_eq!(positive_score(Some(7)), Some(7));
    }

    #[tokio::test]
    async fn rejects_unknown_ssl_mode() {
        let cfg = DatabaseConfig {
            url: "postgres://u:p@localhost/db".to_string(),
            ssl_mode: "sometimes".to_string(),
            max_connections: 1,
            acquire_timeout: std::time::Duration::from_millis(10),
        };
        let err = PgScoreStore::connect(&cfg).await.unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("DATABASE_SSL_MODE")));
    }
}
