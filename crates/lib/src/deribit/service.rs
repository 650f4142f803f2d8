//! Deribit subscription service: one managed session against the public
//! WebSocket API, every received frame persisted as-is.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::session::{OnMessage, OnOpen, SessionController, SessionError, SessionState};
use crate::sink::FileSink;

use super::models::{ChannelUpdate, Operation};

/// Deribit public WebSocket endpoint.
pub const DEFAULT_WS_URL: &str = "wss://www.deribit.com/ws/api/v2";

/// Owns the subscription session to one Deribit endpoint.
pub struct DeribitService {
    session: SessionController,
    sink: FileSink,
    url: String,
    next_id: AtomicU64,
}

impl DeribitService {
    pub fn new(url: impl Into<String>, sink: FileSink) -> Self {
        Self {
            session: SessionController::new(),
            sink,
            url: url.into(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Ids are unique and increasing across every frame this service builds.
    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// JSON-RPC 2.0 subscription frame for the given operation and channels.
    fn request(&self, operation: Operation, channels: &[String]) -> String {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_request_id(),
            "method": operation.method(),
            "params": { "channels": channels },
        })
        .to_string()
    }

    /// Dial the endpoint and subscribe to `channels`. Runs detached:
    /// progress is observed via [`state`](Self::state). No-op while a
    /// session is already live.
    pub async fn start(&self, channels: Vec<String>) {
        let url = self.url.clone();
        let dial = async move {
            tokio_tungstenite::connect_async(&url)
                .await
                .map(|(ws, _)| ws)
        };

        let sink = self.sink.clone();
        let on_message: OnMessage = Box::new(move |frame| {
            if let Err(e) = sink.append(&frame) {
                log::warn!("sink append failed: {}", e);
            }
        });

        let subscribe = self.request(Operation::Subscribe, &channels);
        let session = self.session.clone();
        let on_open: OnOpen = Box::pin(async move {
            if let Err(e) = session.send(subscribe).await {
                log::warn!("initial subscribe not queued: {}", e);
            }
        });

        let meta = format!("{} channel(s)", channels.len());
        self.session
            .start(meta, dial, on_message, Some(on_open))
            .await;
    }

    /// Adjust the live subscription: one subscribe frame for the subscribe
    /// entries, then one unsubscribe frame for the rest (empty groups are
    /// skipped). Errors unless a session is active. Returns the rendered
    /// state.
    pub async fn update(&self, updates: &[ChannelUpdate]) -> Result<String, SessionError> {
        let state = self.session.state().await;
        if !state.is_active() {
            return Err(SessionError::NotActive(state.to_string()));
        }
        for operation in [Operation::Subscribe, Operation::Unsubscribe] {
            let channels: Vec<String> = updates
                .iter()
                .filter(|u| u.operation == operation)
                .map(|u| u.channel.clone())
                .collect();
            if !channels.is_empty() {
                self.session
                    .send(self.request(operation, &channels))
                    .await?;
            }
        }
        Ok(self.session.state().await.to_string())
    }

    /// Queue a graceful stop and return the state as seen right after.
    pub async fn stop(&self) -> String {
        self.session.stop().await;
        self.session.state().await.to_string()
    }

    /// Snapshot of the session state.
    pub async fn state(&self) -> SessionState {
        self.session.state().await
    }

    /// Stop the session and wait for its loop task; used on gateway shutdown.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> DeribitService {
        DeribitService::new(DEFAULT_WS_URL, FileSink::new("/dev/null"))
    }

    #[test]
    fn request_ids_start_at_one_and_increase() {
        let service = service();
        let first: serde_json::Value =
            serde_json::from_str(&service.request(Operation::Subscribe, &["c1".to_string()]))
                .unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&service.request(Operation::Unsubscribe, &["c2".to_string()]))
                .unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(first["jsonrpc"], "2.0");
        assert_eq!(first["method"], "public/subscribe");
        assert_eq!(second["method"], "public/unsubscribe");
        assert_eq!(first["params"]["channels"][0], "c1");
        assert_eq!(second["params"]["channels"][0], "c2");
    }

    #[tokio::test]
    async fn update_without_a_session_errors_with_the_state() {
        let service = service();
        let updates = vec![ChannelUpdate {
            operation: Operation::Subscribe,
            channel: "incremental_ticker.BTC-PERPETUAL".to_string(),
        }];
        let err = service.update(&updates).await.unwrap_err();
        assert!(matches!(err, SessionError::NotActive(_)));
        assert!(err.to_string().contains("IDLE"));
    }

    #[tokio::test]
    async fn stop_without_a_session_reports_idle() {
        let service = service();
        assert_eq!(service.stop().await, "IDLE");
    }
}
