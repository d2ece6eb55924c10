use std::sync::Arc;

use teloxide::prelude::*;

use ngb_core::{
    bot::deliver,
    domain::{ChatId, MessageId, Sender, UserId},
};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let sender = Sender {
        user_id: UserId(user.id.0 as i64),
        display_name: user.first_name.clone(),
    };

    let _guard = state.user_locks.lock_user(sender.user_id.0).await;
    let replies = state.bot.handle(&sender, text).await;
    if replies.is_empty() {
        return Ok(());
    }

    deliver(
        state.messenger.as_ref(),
        ChatId(msg.chat.id.0),
        MessageId(msg.id.0),
        replies,
    )
    .await;
    Ok(())
}
