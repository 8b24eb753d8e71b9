//! Transport adapter: one bidirectional WebSocket connection to the pairing server.
//!
//! A connection reports inbound events and exactly one closure through an
//! [`mpsc`] channel, so network timing never reaches into the state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{self, join_all};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, info, warn};

use super::protocol::{CloseReason, InboundEvent, OutboundEvent};
use crate::error::ChatError;

/// How long to wait for the server to acknowledge a local close.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on [`Connector::drain`], on top of the close grace period.
const DRAIN_SLACK: Duration = Duration::from_secs(1);

/// Lifecycle and data events reported by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An event from the server.
    Message(InboundEvent),
    /// The connection is gone. Delivered once, and nothing follows it.
    Closed(CloseReason),
}

/// Receiving half of a connection.
pub type TransportEvents = mpsc::UnboundedReceiver<TransportEvent>;

/// A live connection owned by a session.
pub trait Connection {
    /// Serializes and transmits an event.
    ///
    /// Fails with [`ChatError::TransportUnavailable`] once the connection is gone.
    fn send(&self, event: &OutboundEvent) -> Result<(), ChatError>;

    /// Requests a graceful shutdown, telling the server why.
    fn close(&self, reason: CloseReason);
}

/// Opens connections.
///
/// `connect` returns immediately; a failed handshake is reported as
/// [`TransportEvent::Closed`] on the returned channel. There is no retry.
pub trait Connector {
    type Connection: Connection;

    fn connect(&self, endpoint: &str) -> (Self::Connection, TransportEvents);

    /// Waits for connections that are shutting down to finish their close handshake.
    fn drain(&self) -> impl Future<Output = ()> + Send {
        future::ready(())
    }
}

#[derive(Debug)]
enum Command {
    Send(String),
    Close(CloseReason),
}

/// Opens WebSocket connections with a bounded handshake.
///
/// Clones share the set of connection tasks, so any clone can [`drain`](Connector::drain) them.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl WebSocketConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            tasks: Arc::default(),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    fn connect(&self, endpoint: &str) -> (Self::Connection, TransportEvents) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_connection(
            endpoint.to_string(),
            self.connect_timeout,
            command_rx,
            event_tx,
        ));

        let mut tasks = self.tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
        drop(tasks);

        (
            WebSocketConnection {
                commands: command_tx,
            },
            event_rx,
        )
    }

    fn drain(&self) -> impl Future<Output = ()> + Send {
        let tasks = std::mem::take(&mut *self.tasks());
        async move {
            if tasks.is_empty() {
                return;
            }
            debug!(count = tasks.len(), "Waiting for connections to close");
            if tokio::time::timeout(CLOSE_GRACE + DRAIN_SLACK, join_all(tasks))
                .await
                .is_err()
            {
                warn!("Gave up waiting for connections to close");
            }
        }
    }
}

/// Handle to a connection task.
///
/// Events sent before the handshake completes are queued and flushed once it does.
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct WebSocketConnection {
    commands: mpsc::UnboundedSender<Command>,
}

impl Connection for WebSocketConnection {
    fn send(&self, event: &OutboundEvent) -> Result<(), ChatError> {
        let json = serde_json::to_string(event)?;
        self.commands
            .send(Command::Send(json))
            .map_err(|_| ChatError::TransportUnavailable)
    }

    fn close(&self, reason: CloseReason) {
        // A finished task has already reported its closure.
        let _ = self.commands.send(Command::Close(reason));
    }
}

async fn run_connection(
    endpoint: String,
    connect_timeout: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let reason = drive_connection(&endpoint, connect_timeout, &mut commands, &events).await;
    debug!(reason = reason.as_str(), "Connection closed");
    let _ = events.send(TransportEvent::Closed(reason));
}

async fn drive_connection(
    endpoint: &str,
    connect_timeout: Duration,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> CloseReason {
    info!(endpoint, "Connecting to chat server");

    let ws_stream =
        match tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(endpoint))
            .await
        {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to connect to chat server");
                return CloseReason::Unrecognized(None);
            }
            Err(_elapsed) => {
                warn!(
                    timeout_secs = connect_timeout.as_secs(),
                    "Chat server handshake timed out"
                );
                return CloseReason::Unrecognized(None);
            }
        };

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let reason = match command {
                    Some(Command::Send(json)) => {
                        if let Err(e) = ws_write.send(WsMessage::Text(json.into())).await {
                            warn!(error = %e, "Failed to send to chat server");
                            return CloseReason::Unrecognized(None);
                        }
                        continue;
                    }
                    Some(Command::Close(reason)) => reason,
                    None => CloseReason::Unrecognized(None),
                };

                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: reason.as_str().to_string().into(),
                };
                let _ = ws_write.send(WsMessage::Close(Some(frame))).await;
                // Wait briefly for the server's close frame; events after a local
                // close are not forwarded.
                let _ = tokio::time::timeout(CLOSE_GRACE, async {
                    while let Some(Ok(msg)) = ws_read.next().await {
                        if matches!(msg, WsMessage::Close(_)) {
                            break;
                        }
                    }
                })
                .await;
                return reason;
            }
            message = ws_read.next() => match message {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<InboundEvent>(text.as_str()) {
                        Ok(event) => {
                            let _ = events.send(TransportEvent::Message(event));
                        }
                        Err(e) => debug!(error = %e, text = text.as_str(), "Unrecognized event from chat server"),
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame.as_ref().map(|f| f.reason.as_str());
                    return CloseReason::parse(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    return CloseReason::Unrecognized(None);
                }
                None => return CloseReason::Unrecognized(None),
            },
        }
    }
}
