//! Telegram adapter (teloxide).
//!
//! This crate implements the `ngb-core` MessagingPort over Telegram Bot API and
//! runs the long-polling dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use ngb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, OutgoingMessage, ReplyKeyboard, TextMarkup},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

pub(crate) fn keyboard_markup(keyboard: &ReplyKeyboard) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
        .collect();
    KeyboardMarkup::new(rows)
        .resize_keyboard(keyboard.resize)
        .one_time_keyboard(keyboard.one_time)
}

// Leaderboard text is escaped for the legacy dialect, not MarkdownV2.
#[allow(deprecated)]
fn legacy_markdown() -> ParseMode {
    ParseMode::Markdown
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_markdown: true,
            supports_reply_keyboards: true,
            max_message_len: 4096,
        }
    }

    async fn send(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        msg: &OutgoingMessage,
    ) -> Result<MessageRef> {
        let markup = msg.keyboard.as_ref().map(keyboard_markup);

        let sent = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), msg.text.clone());
                if msg.markup == TextMarkup::Markdown {
                    req = req.parse_mode(legacy_markdown());
                }
                if let Some(id) = reply_to {
                    req = req.reply_to_message_id(Self::tg_msg_id(id));
                }
                if let Some(m) = &markup {
                    req = req.reply_markup(m.clone());
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.id.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngb_core::bot::{main_menu, LABEL_LEADERBOARD, LABEL_START_GAME};

    #[test]
    fn renders_reply_keyboard() {
        let markup = keyboard_markup(&main_menu());
        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0].len(), 3);
        assert_eq!(markup.keyboard[0][0].text, LABEL_START_GAME);
        assert_eq!(markup.keyboard[0][2].text, LABEL_LEADERBOARD);
        assert_eq!(markup.resize_keyboard, Some(true));
        assert_eq!(markup.one_time_keyboard, Some(true));
    }
}
