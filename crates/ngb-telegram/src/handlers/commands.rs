use teloxide::{prelude::*, types::BotCommand};

/// Commands shown in Telegram's command menu. Menu buttons cover the rest.
pub fn command_list() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Начать и показать меню"),
        BotCommand::new("top", "Топ-10 игроков"),
    ]
}

/// Best-effort: a failure only means the client shows no command hints.
pub async fn register_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(command_list()).await {
        tracing::warn!(error = %e, "failed to register bot commands");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngb_core::bot::{route, Action};

    #[test]
    fn every_listed_command_is_routed() {
        for cmd in command_list() {
            let action = route(&format!("/{}", cmd.command));
            assert!(
                !matches!(action, Action::Guess(_)),
                "/{} falls through to guessing",
                cmd.command
            );
        }
    }
}
