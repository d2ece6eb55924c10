use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_HTTP_PORT: u16 = 5000;
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Database connection settings for the score store.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    /// libpq-style `sslmode` (`require` unless overridden).
    pub ssl_mode: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Typed configuration for the bot.
///
/// Variable names match the Render deployment (`BOT_TOKEN`, `DATABASE_URL`, `PORT`).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub database: DatabaseConfig,

    // Liveness endpoint
    pub http_port: u16,

    // Telegram polling
    pub polling_timeout: Duration,
    pub startup_delay: Duration,

    // Game
    pub leaderboard_limit: usize,
}

impl Config {
    /// Load from the process environment (plus an optional `.env` file).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Required env vars
        let telegram_bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let database_url = lookup("DATABASE_URL").and_then(non_empty).ok_or_else(|| {
            Error::Config("DATABASE_URL environment variable is required".to_string())
        })?;

        let http_port = match lookup("PORT").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a valid port number: {raw}")))?,
            None => DEFAULT_HTTP_PORT,
        };

        let database = DatabaseConfig {
            url: database_url,
            ssl_mode: lookup("DATABASE_SSL_MODE")
                .and_then(non_empty)
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| "require".to_string()),
            max_connections: parse_u32(&lookup, "DATABASE_MAX_CONNECTIONS")
                .unwrap_or(5)
                .max(1),
            acquire_timeout: Duration::from_millis(
                parse_u64(&lookup, "DATABASE_ACQUIRE_TIMEOUT_MS").unwrap_or(5_000),
            ),
        };

        let polling_timeout =
            Duration::from_secs(parse_u64(&lookup, "POLLING_TIMEOUT_SECS").unwrap_or(5));
        let startup_delay =
            Duration::from_secs(parse_u64(&lookup, "BOT_STARTUP_DELAY_SECS").unwrap_or(0));

        let leaderboard_limit = lookup("LEADERBOARD_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT);

        Ok(Self {
            telegram_bot_token,
            database,
            http_port,
            polling_timeout,
            startup_delay,
            leaderboard_limit,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    lookup(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    lookup(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
