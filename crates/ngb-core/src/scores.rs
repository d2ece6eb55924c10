use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{domain::UserId, Result};

/// One leaderboard row: display name and best (lowest) attempt count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub best_score: u32,
}

/// Persistent per-user best scores.
///
/// A best score is the fewest attempts a user ever needed to win; lower is better.
/// Implementations return errors as-is; callers decide how to degrade.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert the user with no best score, or update only the display name.
    async fn upsert_user(&self, user_id: UserId, name: &str) -> Result<()>;

    /// Lower the best score to `attempts` if unset or strictly worse. Unknown users are a no-op.
    async fn record_attempt_count(&self, user_id: UserId, attempts: u32) -> Result<()>;

    async fn best_score(&self, user_id: UserId) -> Result<Option<u32>>;

    /// Users with a best score, ascending, at most `limit` rows. Ties keep storage order.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>>;
}

#[derive(Clone, Debug)]
struct UserRecord {
    user_id: UserId,
    name: String,
    best_score: Option<u32>,
}

/// Process-local score store (insertion ordered). Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn upsert_user(&self, user_id: UserId, name: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.user_id == user_id) {
            Some(existing) => existing.name = name.to_string(),
            None => users.push(UserRecord {
                user_id,
                name: name.to_string(),
                best_score: None,
            }),
        }
        Ok(())
    }

    async fn record_attempt_count(&self, user_id: UserId, attempts: u32) -> Result<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) {
            if user.best_score.map_or(true, |best| attempts < best) {
                user.best_score = Some(attempts);
            }
        }
        Ok(())
    }

    async fn best_score(&self, user_id: UserId) -> Result<Option<u32>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.user_id == user_id)
            .and_then(|u| u.best_score))
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let users = self.users.lock().await;
        let mut ranked: Vec<LeaderboardEntry> = users
            .iter()
            .filter_map(|u| {
                u.best_score.map(|best_score| LeaderboardEntry {
                    name: u.name.clone(),
                    best_score,
                })
            })
            .collect();
        // Stable sort: equal scores stay in insertion order.
        ranked.sort_by_key(|e| e.best_score);
        ranked.truncate(limit);
        Ok(ranked)
    }
}
