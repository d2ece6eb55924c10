//! Command routing: inbound chat text → game / score operation → replies.

use std::sync::Arc;

use crate::{
    domain::{ChatId, MessageId, Sender},
    formatting::format_leaderboard,
    game::{GameEngine, GuessOutcome},
    messaging::{
        port::MessagingPort,
        types::{OutgoingMessage, ReplyKeyboard, TextMarkup},
    },
    scores::ScoreStore,
};

pub const LABEL_START_GAME: &str = "🎮 Начать игру";
pub const LABEL_PLAY_AGAIN: &str = "🎮 Сыграть ещё";
pub const LABEL_MY_SCORE: &str = "🏆 Мой счёт";
pub const LABEL_LEADERBOARD: &str = "🏅 Топ-10";

const TEXT_GAME_STARTED: &str = "Я загадал число от 1 до 100. Какое число?";
const TEXT_NOT_A_NUMBER: &str = "Пожалуйста, введи число!";
const TEXT_GO_HIGHER: &str = "Больше! 📈";
const TEXT_GO_LOWER: &str = "Меньше! 📉";
const TEXT_CHOOSE_ACTION: &str = "Выбери действие:";
const TEXT_NO_SCORE: &str = "Ты ещё не угадал число. Нажми 'Начать игру'!";
const TEXT_NO_RECORDS: &str = "Пока нет рекордов. Сыграй и установи свой!";

/// What an inbound message asks the bot to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// `/start`: register the user and show the menu.
    Welcome,
    StartGame,
    ShowScore,
    /// `/top` or the leaderboard button.
    ShowLeaderboard,
    /// Anything else; only meaningful while a game is in progress.
    Guess(String),
}

/// Map inbound text to an [`Action`]. Menu labels win over guesses.
pub fn route(text: &str) -> Action {
    let trimmed = text.trim();

    if trimmed.starts_with('/') {
        let (cmd, _args) = parse_command(trimmed);
        match cmd.as_str() {
            "start" => return Action::Welcome,
            "top" => return Action::ShowLeaderboard,
            _ => {}
        }
    }

    match trimmed {
        LABEL_START_GAME | LABEL_PLAY_AGAIN => Action::StartGame,
        LABEL_MY_SCORE => Action::ShowScore,
        LABEL_LEADERBOARD => Action::ShowLeaderboard,
        _ => Action::Guess(text.to_string()),
    }
}

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn leaderboard_title(limit: usize) -> String {
    format!("🏆 *ТОП-{limit} ЛУЧШИХ ИГРОКОВ*")
}

pub fn main_menu() -> ReplyKeyboard {
    ReplyKeyboard::single_row(&[LABEL_START_GAME, LABEL_MY_SCORE, LABEL_LEADERBOARD])
}

pub fn play_again_menu() -> ReplyKeyboard {
    ReplyKeyboard::single_row(&[LABEL_PLAY_AGAIN, LABEL_MY_SCORE, LABEL_LEADERBOARD])
}

/// The chat-facing application: routes messages and turns outcomes into replies.
///
/// Storage failures never escape from here; they are logged and the user gets the
/// same reply as if there were simply no data.
#[derive(Clone)]
pub struct GameBot {
    engine: GameEngine,
    scores: Arc<dyn ScoreStore>,
    leaderboard_limit: usize,
}

impl GameBot {
    pub fn new(engine: GameEngine, scores: Arc<dyn ScoreStore>, leaderboard_limit: usize) -> Self {
        Self {
            engine,
            scores,
            leaderboard_limit,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub async fn handle(&self, sender: &Sender, text: &str) -> Vec<OutgoingMessage> {
        match route(text) {
            Action::Welcome => self.welcome(sender).await,
            Action::StartGame => {
                self.engine.start(sender.user_id).await;
                vec![OutgoingMessage::text(TEXT_GAME_STARTED)]
            }
            Action::ShowScore => self.show_score(sender).await,
            Action::ShowLeaderboard => self.show_leaderboard().await,
            Action::Guess(raw) => self.guess(sender, &raw).await,
        }
    }

    async fn welcome(&self, sender: &Sender) -> Vec<OutgoingMessage> {
        if let Err(e) = self
            .scores
            .upsert_user(sender.user_id, &sender.display_name)
            .await
        {
            tracing::error!(user_id = sender.user_id.0, error = %e, "failed to save user");
        }

        let text = format!(
            "Привет, {}! Я загадаю число от 1 до 100 — попробуй угадать!\nЖми 'Начать игру'.",
            sender.display_name
        );
        vec![OutgoingMessage::text(text).with_keyboard(main_menu())]
    }

    async fn show_score(&self, sender: &Sender) -> Vec<OutgoingMessage> {
        let best = match self.scores.best_score(sender.user_id).await {
            Ok(best) => best,
            Err(e) => {
                tracing::error!(user_id = sender.user_id.0, error = %e, "failed to load score");
                None
            }
        };

        let text = match best {
            Some(score) => format!("🏆 Твой лучший результат: {score} попыток"),
            None => TEXT_NO_SCORE.to_string(),
        };
        vec![OutgoingMessage::reply(text)]
    }

    async fn show_leaderboard(&self) -> Vec<OutgoingMessage> {
        let entries = match self.scores.leaderboard(self.leaderboard_limit).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "failed to load leaderboard");
                Vec::new()
            }
        };

        if entries.is_empty() {
            return vec![OutgoingMessage::reply(TEXT_NO_RECORDS)];
        }
        let title = leaderboard_title(self.leaderboard_limit);
        vec![OutgoingMessage::reply(format_leaderboard(&title, &entries)).markdown()]
    }

    async fn guess(&self, sender: &Sender, raw: &str) -> Vec<OutgoingMessage> {
        match self.engine.guess(sender.user_id, raw).await {
            GuessOutcome::NotStarted => {
                tracing::debug!(user_id = sender.user_id.0, "ignoring text outside a game");
                Vec::new()
            }
            GuessOutcome::InvalidInput => vec![OutgoingMessage::reply(TEXT_NOT_A_NUMBER)],
            GuessOutcome::TooLow => vec![OutgoingMessage::reply(TEXT_GO_HIGHER)],
            GuessOutcome::TooHigh => vec![OutgoingMessage::reply(TEXT_GO_LOWER)],
            GuessOutcome::Won { attempts } => vec![
                OutgoingMessage::reply(format!(
                    "🎉 Поздравляю! Ты угадал за {attempts} попыток!"
                )),
                OutgoingMessage::text(TEXT_CHOOSE_ACTION).with_keyboard(play_again_menu()),
            ],
        }
    }
}

/// Send replies in order. Failures are logged per message and do not stop the rest.
///
/// Keyboards and Markdown are dropped and text is clipped when the messenger cannot
/// carry them.
pub async fn deliver(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    reply_to: MessageId,
    replies: Vec<OutgoingMessage>,
) -> usize {
    let caps = messenger.capabilities();
    let mut sent = 0usize;

    for mut reply in replies {
        if !caps.supports_reply_keyboards {
            reply.keyboard = None;
        }
        if !caps.supports_markdown {
            reply.markup = TextMarkup::Plain;
        }
        if reply.text.chars().count() > caps.max_message_len {
            reply.text = clip_text(&reply.text, reply.markup, caps.max_message_len);
        }

        let quote = reply.quote.then_some(reply_to);
        match messenger.send(chat_id, quote, &reply).await {
            Ok(_) => sent += 1,
            Err(e) => tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply"),
        }
    }
    sent
}

fn clip_text(text: &str, markup: TextMarkup, max_len: usize) -> String {
    let mut clipped: String = text.chars().take(max_len).collect();
    // Entities in our Markdown never span lines, so a cut at a line break leaves them closed.
    if markup == TextMarkup::Markdown {
        if let Some(end) = clipped.rfind('\n') {
            clipped.truncate(end + 1);
        }
    }
    clipped
}
