//! Liveness HTTP endpoint (axum).
//!
//! Exists only so the hosting platform sees an open port; it never touches game state.

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use ngb_core::{errors::Error, Result};

pub const ROOT_BODY: &str = "✅ Telegram Bot is running! Port is open.";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> (StatusCode, &'static str) {
    (StatusCode::OK, ROOT_BODY)
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "Bot is alive",
    })
}

/// Serve the liveness routes on `0.0.0.0:port` until `shutdown` is cancelled.
pub async fn serve(port: u16, shutdown: CancellationToken) -> Result<()> {
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(bind_addr).await?;
    serve_on(listener, shutdown).await
}

/// Serve the liveness routes on an already bound listener.
pub async fn serve_on(listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
    tracing::info!(addr = ?listener.local_addr().ok(), "liveness endpoint listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::External(format!("liveness server failed: {e}")))?;

    tracing::info!("liveness endpoint stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_reports_running() {
        let (status, body) = root().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("running"));
    }

    #[tokio::test]
    async fn health_payload_shape() {
        let Json(payload) = health().await;
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "ok", "message": "Bot is alive"})
        );
    }

    #[tokio::test]
    async fn routes_answer_over_http() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(serve_on(listener, shutdown.clone()));

        let root = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(root.status(), reqwest::StatusCode::OK);
        assert_eq!(root.text().await.unwrap(), ROOT_BODY);

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(health.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = health.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "ok", "message": "Bot is alive"})
        );

        let missing = reqwest::get(format!("{base}/nope")).await.unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(serve(0, shutdown.clone()));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.cancel();
        let res = tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("server did not stop")
            .expect("task panicked");
        assert!(res.is_ok());
    }
}
