//! Public façade for one subscription session: bounded command queue,
//! observable state, idempotent start.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Error as WsError;

use super::event_loop::{self, OnMessage, OnOpen, WsStream};
use super::{Command, SessionError, SessionState};

/// Commands a producer may queue ahead of the loop before backpressure
/// suspends it.
const COMMAND_QUEUE_CAPACITY: usize = 5;

/// Controls one logical subscription session. Cloning shares the same
/// session (queue, state cell, loop task).
#[derive(Clone)]
pub struct SessionController {
    state: Arc<RwLock<SessionState>>,
    cmd_tx: mpsc::Sender<Command>,
    /// The receiving half outlives socket instances; each loop locks it for
    /// its lifetime.
    cmd_rx: Arc<Mutex<mpsc::Receiver<Command>>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionController {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(SessionState::Idle)),
            cmd_tx,
            cmd_rx: Arc::new(Mutex::new(cmd_rx)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Snapshot of the current state. Safe to call from any task, including
    /// concurrently with the loop.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Open a socket via `dial` and enter the event loop in a detached task.
    ///
    /// No-op while a session is already Connecting or Active, so a double
    /// start cannot open a second socket. The task's outcome is observed
    /// only through [`state`](Self::state): dial failures and transport
    /// errors land in `Failed`, a clean close in `Closed`.
    pub async fn start<D>(
        &self,
        meta: impl Into<String>,
        dial: D,
        on_message: OnMessage,
        on_open: Option<OnOpen>,
    ) where
        D: Future<Output = Result<WsStream, WsError>> + Send + 'static,
    {
        {
            let mut state = self.state.write().await;
            if !state.may_start() {
                log::debug!("start ignored: session is {}", state);
                return;
            }
            *state = SessionState::Connecting;
        }

        let meta = meta.into();
        let state = self.state.clone();
        let cmd_rx = self.cmd_rx.clone();
        let handle = tokio::spawn(async move {
            let ws = match dial.await {
                Ok(ws) => ws,
                Err(e) => {
                    let err = SessionError::Dial(e);
                    log::warn!("{}", err);
                    *state.write().await = SessionState::Failed(err.to_string());
                    return;
                }
            };
            if let Err(e) = event_loop::run(ws, state, cmd_rx, on_message, on_open, meta).await {
                log::error!("session loop exited: {}", e);
            }
        });
        *self.task.lock().await = Some(handle);
    }

    /// Queue an outbound frame. Suspends the caller while the queue is full;
    /// rejected with `NotActive` when no session is live to consume it.
    pub async fn send(&self, payload: impl Into<String>) -> Result<(), SessionError> {
        {
            let state = self.state.read().await;
            if !state.accepts_commands() {
                return Err(SessionError::NotActive(state.to_string()));
            }
        }
        // The state guard must be dropped before awaiting queue space: the
        // loop takes the write lock to exit.
        if self.cmd_tx.send(Command::Send(payload.into())).await.is_err() {
            log::debug!("command queue closed");
        }
        Ok(())
    }

    /// Queue a graceful close of the live session; logged no-op otherwise.
    pub async fn stop(&self) {
        {
            let state = self.state.read().await;
            if !state.accepts_commands() {
                log::debug!("stop ignored: session is {}", state);
                return;
            }
        }
        if self.cmd_tx.send(Command::Shutdown).await.is_err() {
            log::debug!("command queue closed");
        }
    }

    /// Stop the live session (if any) and wait for its loop task to finish.
    pub async fn shutdown(&self) {
        self.stop().await;
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                log::warn!("session task panicked");
            }
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
