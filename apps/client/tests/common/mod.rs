//! Shared test fixtures: an in-process mock relay plus recording
//! implementations of the capability interfaces.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use gamelink_client::relay::{
    ClientEvent, GameInvite, GameTarget, Navigator, Notice, Notifier, ServerEvent,
};

/// Mock relay handle: received client events come out of `outbox`, server
/// pushes go in through `push`.
pub struct MockRelay {
    pub url: String,
    pub outbox: mpsc::UnboundedReceiver<ClientEvent>,
    pub push: broadcast::Sender<ServerEvent>,
}

#[derive(Clone)]
struct RelayState {
    outbox: mpsc::UnboundedSender<ClientEvent>,
    push: broadcast::Sender<ServerEvent>,
}

/// Start a WebSocket relay on an ephemeral port. The server parses client
/// frames into [`ClientEvent`]s and forwards injected [`ServerEvent`]s as
/// JSON frames.
pub async fn start_relay() -> MockRelay {
    start_relay_at("127.0.0.1:0".parse().unwrap()).await
}

pub async fn start_relay_at(addr: SocketAddr) -> MockRelay {
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
    let (push_tx, _) = broadcast::channel(64);

    let state = RelayState {
        outbox: outbox_tx,
        push: push_tx.clone(),
    };
    let app = Router::new()
        .route("/socket", get(ws_upgrade))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockRelay {
        url: format!("ws://{addr}/socket"),
        outbox: outbox_rx,
        push: push_tx,
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<RelayState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_session(socket, state))
}

async fn relay_session(socket: WebSocket, state: RelayState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut push_rx = state.push.subscribe();
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(event) = serde_json::from_str::<ClientEvent>(&text) {
                            let _ = state.outbox.send(event);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            event = push_rx.recv() => {
                match event {
                    Ok(event) => {
                        let json = serde_json::to_string(&event).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    }
}

/// Receive the next client event the relay saw, with a timeout.
pub async fn expect_event(outbox: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    time::timeout(Duration::from_secs(5), outbox.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("relay outbox closed")
}

/// The client announces join + both snapshot fetches on connect; drain them.
pub async fn drain_announcement(outbox: &mut mpsc::UnboundedReceiver<ClientEvent>) {
    for _ in 0..3 {
        expect_event(outbox).await;
    }
}

/// Poll until a condition holds or fail the test.
pub async fn wait_for(what: &str, condition: impl Fn() -> bool) {
    let deadline = time::Instant::now() + Duration::from_secs(5);
    while time::Instant::now() < deadline {
        if condition() {
            return;
        }
        time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {what}");
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub accept_invites: bool,
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            accept_invites: true,
            ..Self::default()
        })
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn friend_request_notices(&self) -> usize {
        self.notices
            .lock()
            .iter()
            .filter(|n| matches!(n, Notice::FriendRequest { .. }))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }

    async fn confirm_invite(&self, _invite: &GameInvite) -> bool {
        self.accept_invites
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &GameTarget) {
        self.paths.lock().push(target.path());
    }
}
