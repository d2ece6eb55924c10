use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ngb_core::{
    bot::GameBot,
    config::Config,
    game::{GameEngine, GameRegistry},
    scores::ScoreStore,
};
use ngb_postgres::PgScoreStore;

#[tokio::main]
async fn main() -> Result<(), ngb_core::Error> {
    ngb_core::logging::init("ngb")?;

    let cfg = Arc::new(Config::load()?);

    let store = PgScoreStore::connect(&cfg.database).await?;
    store.ensure_schema().await?;
    let scores: Arc<dyn ScoreStore> = Arc::new(store);

    let engine = GameEngine::new(Arc::new(GameRegistry::new()), scores.clone());
    let game = GameBot::new(engine, scores, cfg.leaderboard_limit);

    // Liveness runs on its own task so polling never blocks it (and vice versa).
    let shutdown = CancellationToken::new();
    let liveness = tokio::spawn(ngb_liveness::serve(cfg.http_port, shutdown.clone()));

    let polled = ngb_telegram::router::run_polling(cfg, game).await;

    shutdown.cancel();
    match liveness.await {
        Ok(Err(e)) => tracing::error!(error = %e, "liveness endpoint failed"),
        Err(e) => tracing::error!(error = %e, "liveness task panicked"),
        Ok(Ok(())) => {}
    }

    polled.map_err(|e| ngb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
