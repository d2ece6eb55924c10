use std::{collections::HashMap, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::Polling,
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use ngb_core::{bot::GameBot, config::Config, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub bot: GameBot,
    pub messenger: Arc<dyn MessagingPort>,
    pub user_locks: Arc<UserLocks>,
}

/// One async lock per user, so a user's messages are handled strictly in order.
///
/// Entries nobody holds or waits on are dropped on the next lookup, so the map
/// only tracks users with messages in flight.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(cfg: Arc<Config>, game: GameBot) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Gives a previous instance time to drop its long-poll during redeploys.
    if !cfg.startup_delay.is_zero() {
        tracing::info!(delay_secs = cfg.startup_delay.as_secs(), "delaying bot start");
        tokio::time::sleep(cfg.startup_delay).await;
    }

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot started"),
        Err(e) => tracing::warn!(error = %e, "getMe failed; continuing"),
    }
    handlers::commands::register_commands(&bot).await;

    let state = Arc::new(AppState {
        bot: game,
        messenger: Arc::new(TelegramMessenger::new(bot.clone())),
        user_locks: Arc::new(UserLocks::default()),
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let listener = Polling::builder(bot.clone())
        .timeout(cfg.polling_timeout)
        .drop_pending_updates()
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "an error occurred in the update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("an error occurred in the update listener"),
        )
        .await;

    tracing::info!("polling stopped");
    Ok(())
}
