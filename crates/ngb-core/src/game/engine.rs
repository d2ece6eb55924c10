use std::{cmp::Ordering, sync::Arc};

use crate::{domain::UserId, scores::ScoreStore};

use super::registry::GameRegistry;

/// Result of feeding one message into a user's game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The user has no game in progress.
    NotStarted,
    /// Not an integer; the attempt was not counted.
    InvalidInput,
    /// The guess is below the secret.
    TooLow,
    /// The guess is above the secret.
    TooHigh,
    /// Correct; the game is over.
    Won { attempts: u32 },
}

/// Drives games in the registry and reports wins to the score store.
#[derive(Clone)]
pub struct GameEngine {
    registry: Arc<GameRegistry>,
    scores: Arc<dyn ScoreStore>,
}

impl GameEngine {
    pub fn new(registry: Arc<GameRegistry>, scores: Arc<dyn ScoreStore>) -> Self {
        Self { registry, scores }
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub async fn start(&self, user_id: UserId) {
        self.registry.start(user_id).await;
        let active_games = self.registry.active_games().await;
        tracing::info!(user_id = user_id.0, active_games, "game started");
    }

    pub async fn guess(&self, user_id: UserId, raw_input: &str) -> GuessOutcome {
        let parsed = raw_input.trim().parse::<i64>().ok();

        let outcome = self
            .registry
            .with_session(user_id, |session| {
                let Some(guess) = parsed else {
                    return (GuessOutcome::InvalidInput, true);
                };
                let attempts = session.count_attempt();
                match guess.cmp(&session.secret()) {
                    Ordering::Less => (GuessOutcome::TooLow, true),
                    Ordering::Greater => (GuessOutcome::TooHigh, true),
                    Ordering::Equal => (GuessOutcome::Won { attempts }, false),
                }
            })
            .await
            .unwrap_or(GuessOutcome::NotStarted);

        if let GuessOutcome::Won { attempts } = outcome {
            tracing::info!(user_id = user_id.0, attempts, "game won");
            if let Err(e) = self.scores.record_attempt_count(user_id, attempts).await {
                tracing::error!(user_id = user_id.0, attempts, error = %e, "failed to record score");
            }
        }

        outcome
    }
}
