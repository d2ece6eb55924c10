use std::{collections::HashMap, ops::RangeInclusive};

use rand::Rng;
use tokio::sync::Mutex;

use crate::domain::UserId;

/// Secrets are drawn uniformly from this range.
pub const SECRET_RANGE: RangeInclusive<i64> = 1..=100;

/// One in-progress game: the hidden number and how many guesses were counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSession {
    secret: i64,
    attempts: u32,
}

impl GameSession {
    fn new(secret: i64) -> Self {
        Self {
            secret,
            attempts: 0,
        }
    }

    pub fn secret(&self) -> i64 {
        self.secret
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn count_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }
}

/// At most one game per user, behind a single coarse lock.
///
/// Sessions never expire: an abandoned game is dropped only when the same user
/// starts a new one or wins.
#[derive(Debug, Default)]
pub struct GameRegistry {
    sessions: Mutex<HashMap<UserId, GameSession>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh game with a random secret, discarding any unfinished one.
    pub async fn start(&self, user_id: UserId) {
        let secret = rand::rng().random_range(SECRET_RANGE);
        self.start_with_secret(user_id, secret).await;
    }

    /// Same as [`GameRegistry::start`] with a caller-chosen secret.
    pub async fn start_with_secret(&self, user_id: UserId, secret: i64) {
        let replaced = self
            .sessions
            .lock()
            .await
            .insert(user_id, GameSession::new(secret));
        if let Some(old) = replaced {
            tracing::debug!(
                user_id = user_id.0,
                abandoned_attempts = old.attempts,
                "replaced unfinished game"
            );
        }
    }

    pub async fn get(&self, user_id: UserId) -> Option<GameSession> {
        self.sessions.lock().await.get(&user_id).copied()
    }

    pub async fn end(&self, user_id: UserId) -> Option<GameSession> {
        self.sessions.lock().await.remove(&user_id)
    }

    pub async fn active_games(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Run `f` against the user's session while holding the registry lock.
    ///
    /// `f` returns the result plus whether the session should stay; `None` if there is no game.
    pub(crate) async fn with_session<R>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut GameSession) -> (R, bool),
    ) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user_id)?;
        let (out, keep) = f(session);
        if !keep {
            sessions.remove(&user_id);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_draws_secret_in_range_with_zero_attempts() {
        let reg = GameRegistry::new();
        for id in 0..200 {
            reg.start(UserId(id)).await;
            let s = reg.get(UserId(id)).await.unwrap();
            assert!(SECRET_RANGE.contains(&s.secret()));
            assert_eq!(s.attempts(), 0);
        }
        assert_eq!(reg.active_games().await, 200);
    }

    #[tokio::test]
    async fn restart_discards_previous_session() {
        let reg = GameRegistry::new();
        let u = UserId(1);
        reg.start_with_secret(u, 10).await;
        reg.with_session(u, |s| (s.count_attempt(), true)).await;
        reg.with_session(u, |s| (s.count_attempt(), true)).await;
        assert_eq!(reg.get(u).await.unwrap().attempts(), 2);

        reg.start_with_secret(u, 77).await;
        let s = reg.get(u).await.unwrap();
        assert_eq!(s.secret(), 77);
        assert_eq!(s.attempts(), 0);
        assert_eq!(reg.active_games().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let reg = GameRegistry::new();
        reg.start_with_secret(UserId(1), 5).await;
        reg.start_with_secret(UserId(2), 95).await;

        reg.with_session(UserId(1), |s| (s.count_attempt(), true))
            .await;

        assert_eq!(reg.get(UserId(1)).await.unwrap().attempts(), 1);
        assert_eq!(reg.get(UserId(2)).await.unwrap().attempts(), 0);
        assert_eq!(reg.get(UserId(2)).await.unwrap().secret(), 95);
    }

    #[tokio::test]
    async fn end_removes_and_with_session_can_drop() {
        let reg = GameRegistry::new();
        reg.start_with_secret(UserId(1), 5).await;
        reg.start_with_secret(UserId(2), 6).await;

        assert_eq!(reg.end(UserId(1)).await.map(|s| s.secret()), Some(5));
        assert!(reg.get(UserId(1)).await.is_none());
        assert!(reg.end(UserId(1)).await.is_none());

        let out = reg.with_session(UserId(2), |_| ("done", false)).await;
        assert_eq!(out, Some("done"));
        assert!(reg.get(UserId(2)).await.is_none());
        assert!(reg.with_session(UserId(2), |_| ((), true)).await.is_none());
    }

    #[tokio::test]
    async fn concurrent_users_do_not_corrupt_the_map() {
        let reg = std::sync::Arc::new(GameRegistry::new());
        let mut handles = Vec::new();
        for id in 0..32 {
            let reg = reg.clone();
            handles.push(tokio::spawn(async move {
                let u = UserId(id);
                reg.start_with_secret(u, 1000).await;
                for _ in 0..10 {
                    reg.with_session(u, |s| (s.count_attempt(), true)).await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        for id in 0..32 {
            assert_eq!(reg.get(UserId(id)).await.unwrap().attempts(), 10);
        }
    }
}
