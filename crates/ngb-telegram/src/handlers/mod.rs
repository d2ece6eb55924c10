//! Telegram update handlers.
//!
//! Each handler is a small adapter that:
//! - extracts the sender from the update
//! - serialises the user's messages via `UserLocks`
//! - calls into the `ngb-core` command router and delivers its replies

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

pub mod commands;
mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.text().is_some() {
        return text::handle_text(msg, state).await;
    }

    // Stickers, photos, voice etc. carry nothing the game understands.
    tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
    Ok(())
}
