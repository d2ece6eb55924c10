//! Core domain + application logic for the number-guessing bot.
//!
//! This crate is intentionally framework-agnostic. Telegram, PostgreSQL and the
//! liveness HTTP server live behind ports (traits) implemented in adapter crates.

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod game;
pub mod logging;
pub mod messaging;
pub mod scores;

pub use errors::{Error, Result};
