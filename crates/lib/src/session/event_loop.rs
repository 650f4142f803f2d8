//! The multiplexing engine: owns the socket, races inbound frames against
//! queued commands, and drives state transitions until the socket closes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{Command, SessionError, SessionState};

/// Client-side WebSocket connection, as produced by `connect_async`.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Called once per inbound frame, in receipt order. Must not block the loop;
/// hand slow work off to another task.
pub type OnMessage = Box<dyn FnMut(String) + Send>;

/// Awaited once per successful connection, after the state turns Active and
/// before the first multiplex pass. May enqueue commands.
pub type OnOpen = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Run the loop until the socket closes, for any reason.
///
/// Exactly one instance runs at a time: the receiver lock is held for the
/// whole loop lifetime and `start` refuses to spawn a second instance while
/// the state is Connecting or Active. Both select branches
/// (`StreamExt::next`, `Receiver::recv`) are cancel-safe, so the losing
/// branch of each pass is dropped without losing a frame or a command.
pub(crate) async fn run(
    mut ws: WsStream,
    state: Arc<RwLock<SessionState>>,
    cmd_rx: Arc<Mutex<mpsc::Receiver<Command>>>,
    mut on_message: OnMessage,
    on_open: Option<OnOpen>,
    meta: String,
) -> Result<(), SessionError> {
    let mut cmd_rx = cmd_rx.lock().await;

    *state.write().await = SessionState::Active(meta);
    if let Some(on_open) = on_open {
        on_open.await;
    }

    loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(payload))) => on_message(payload),
                Some(Ok(Message::Binary(bytes))) => {
                    on_message(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(Message::Close(_))) | None => return close(&mut ws, &state).await,
                Some(Ok(_)) => {} // ping/pong, answered by the protocol layer
                Some(Err(e)) if is_clean_close(&e) => return close(&mut ws, &state).await,
                Some(Err(e)) => return fail(&state, e).await,
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(payload)) => match ws.send(Message::Text(payload)).await {
                    Ok(()) => {}
                    Err(e) if is_clean_close(&e) => return close(&mut ws, &state).await,
                    Err(e) => return fail(&state, e).await,
                },
                // None: every sender is gone; treat it like a shutdown request.
                Some(Command::Shutdown) | None => {
                    drain_ready_frames(&mut ws, &mut on_message);
                    return close(&mut ws, &state).await;
                }
            },
        }
    }
}

/// A frame that was already ready when the shutdown arrived is still
/// delivered. Single poll per frame; nothing is awaited.
fn drain_ready_frames(ws: &mut WsStream, on_message: &mut OnMessage) {
    while let Some(Some(Ok(Message::Text(payload)))) = ws.next().now_or_never() {
        on_message(payload);
    }
}

fn is_clean_close(e: &WsError) -> bool {
    matches!(e, WsError::ConnectionClosed | WsError::AlreadyClosed)
}

async fn close(ws: &mut WsStream, state: &RwLock<SessionState>) -> Result<(), SessionError> {
    if let Err(e) = ws.close(None).await {
        if !is_clean_close(&e) {
            log::debug!("close handshake: {}", e);
        }
    }
    *state.write().await = SessionState::Closed;
    Ok(())
}

async fn fail(state: &RwLock<SessionState>, e: WsError) -> Result<(), SessionError> {
    let err = SessionError::Transport(e);
    *state.write().await = SessionState::Failed(err.to_string());
    Err(err)
}
