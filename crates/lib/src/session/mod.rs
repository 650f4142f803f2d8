//! Managed subscription session over a persistent WebSocket.
//!
//! [`SessionController`] is the public façade (start/send/stop, observable
//! state); the event loop owns the live socket and multiplexes inbound
//! frames with queued commands. One session drives one socket at a time;
//! restart policy is the caller's.

mod controller;
mod event_loop;
mod state;

pub use controller::SessionController;
pub use event_loop::{OnMessage, OnOpen, WsStream};
pub use state::SessionState;

use tokio_tungstenite::tungstenite;

/// Commands consumed one at a time, in order, by the event loop.
#[derive(Debug)]
pub(crate) enum Command {
    /// Opaque outbound frame, written verbatim.
    Send(String),
    /// Graceful close of the current socket.
    Shutdown,
}

/// Session failures. Dial and transport errors also surface through
/// [`SessionState::Failed`]; `NotActive` is returned synchronously when a
/// command is issued with no live session to consume it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("dial failed: {0}")]
    Dial(#[source] tungstenite::Error),
    #[error("transport failed: {0}")]
    Transport(#[from] tungstenite::Error),
    #[error("session is not active: {0}")]
    NotActive(String),
}
