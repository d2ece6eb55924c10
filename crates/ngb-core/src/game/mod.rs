//! Per-user guessing games: the session registry and the engine that advances them.

pub mod engine;
pub mod registry;

pub use engine::{GameEngine, GuessOutcome};
pub use registry::{GameRegistry, GameSession, SECRET_RANGE};
