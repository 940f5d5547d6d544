//! WebSocket transport to the relay: connect policy, event pump, teardown.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch, Notify};
use tokio::time;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::Config;
use crate::error::ClientError;

use super::events::{ClientEvent, ServerEvent};

/// Transport connectivity, visible to callers for pre-flight checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events delivered to the protocol core: transport lifecycle plus parsed
/// relay pushes.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    Server(ServerEvent),
}

/// Outbound seam between the protocol core and the transport. Emitting while
/// not connected is rejected, never queued.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError>;
    fn is_connected(&self) -> bool;
}

/// Handle to the relay WebSocket, driven by a background task.
///
/// The driver connects with a per-attempt timeout and a bounded number of
/// attempts at fixed spacing. Once the ceiling is reached it parks in
/// `Disconnected` until [`RelayConnection::reconnect`] or
/// [`RelayConnection::close`]. Transport loss after a successful connect
/// re-enters the connect cycle with a fresh attempt budget.
pub struct RelayConnection {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    state: Arc<RwLock<ConnectionState>>,
    attempts: Arc<AtomicU32>,
    shutdown: watch::Sender<bool>,
    retrigger: Arc<Notify>,
}

impl RelayConnection {
    /// Open the connection lazily in a background task. Returns the handle
    /// and the stream of [`RelayEvent`]s for the protocol core to consume.
    pub fn connect(config: Config) -> (Arc<Self>, mpsc::UnboundedReceiver<RelayEvent>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let state = Arc::new(RwLock::new(ConnectionState::Disconnected));
        let attempts = Arc::new(AtomicU32::new(0));
        let retrigger = Arc::new(Notify::new());

        tokio::spawn(drive(
            config,
            state.clone(),
            attempts.clone(),
            shutdown_rx,
            retrigger.clone(),
            events_tx,
            outbound_rx,
        ));

        let connection = Arc::new(Self {
            outbound: outbound_tx,
            state,
            attempts,
            shutdown: shutdown_tx,
            retrigger,
        });
        (connection, events_rx)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Consecutive failed connect attempts in the current cycle. Reset to
    /// zero on a successful handshake.
    pub fn connect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Re-trigger a connection whose retry budget is exhausted.
    pub fn reconnect(&self) {
        self.retrigger.notify_one();
    }

    /// Tear the transport down. Idempotent; the connection stays
    /// `Disconnected` afterwards and a later surface must build a fresh one.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl EventSink for RelayConnection {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        self.outbound
            .send(event)
            .map_err(|_| ClientError::Transport("connection task stopped".to_string()))
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Background driver: connect cycle, then the select pump over inbound
/// frames, the outbound queue, and teardown.
async fn drive(
    config: Config,
    state: Arc<RwLock<ConnectionState>>,
    attempts: Arc<AtomicU32>,
    mut shutdown: watch::Receiver<bool>,
    retrigger: Arc<Notify>,
    events: mpsc::UnboundedSender<RelayEvent>,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
) {
    'outer: loop {
        if *shutdown.borrow() {
            break;
        }

        // Bounded connect attempts at fixed spacing.
        let mut stream = None;
        for attempt in 1..=config.max_connect_attempts {
            *state.write() = ConnectionState::Connecting;
            attempts.store(attempt, Ordering::Relaxed);

            match time::timeout(config.connect_timeout, connect_async(config.relay_url.as_str()))
                .await
            {
                Ok(Ok((ws, _))) => {
                    stream = Some(ws);
                    break;
                }
                Ok(Err(e)) => {
                    tracing::debug!(attempt, error = %e, "relay connect failed");
                    let _ = events.send(RelayEvent::ConnectError(e.to_string()));
                }
                Err(_) => {
                    tracing::debug!(attempt, "relay connect timed out");
                    let _ = events.send(RelayEvent::ConnectError("connect timeout".to_string()));
                }
            }
            *state.write() = ConnectionState::Disconnected;

            if attempt < config.max_connect_attempts {
                tokio::select! {
                    _ = time::sleep(config.reconnect_delay) => {}
                    _ = shutdown.changed() => {}
                }
                if *shutdown.borrow() {
                    break 'outer;
                }
            }
        }

        let Some(ws) = stream else {
            // Attempt ceiling reached: stay Disconnected until an explicit
            // re-trigger or teardown.
            tracing::warn!(
                attempts = config.max_connect_attempts,
                url = %config.relay_url,
                "relay unreachable, waiting for explicit reconnect"
            );
            tokio::select! {
                _ = retrigger.notified() => continue 'outer,
                _ = shutdown.changed() => break 'outer,
            }
        };

        attempts.store(0, Ordering::Relaxed);
        *state.write() = ConnectionState::Connected;
        let _ = events.send(RelayEvent::Connected);
        tracing::info!(url = %config.relay_url, "relay connected");

        let (mut ws_tx, mut ws_rx) = ws.split();
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ServerEvent>(&text) {
                                Ok(ev) => {
                                    let _ = events.send(RelayEvent::Server(ev));
                                }
                                Err(e) => tracing::debug!(?e, "unparseable relay message"),
                            }
                        }
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(?e, "relay read error");
                            break;
                        }
                        _ => continue,
                    }
                }

                ev = outbound.recv() => {
                    match ev {
                        Some(ev) => {
                            let json = match serde_json::to_string(&ev) {
                                Ok(json) => json,
                                Err(e) => {
                                    tracing::debug!(?e, "unserializable outbound event");
                                    continue;
                                }
                            };
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        // All handles dropped; nothing can emit anymore.
                        None => break 'outer,
                    }
                }

                _ = shutdown.changed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        *state.write() = ConnectionState::Disconnected;
        let _ = events.send(RelayEvent::Disconnected);
        if *shutdown.borrow() {
            break;
        }
        tracing::info!("relay connection lost, reconnecting");
    }

    *state.write() = ConnectionState::Disconnected;
}
