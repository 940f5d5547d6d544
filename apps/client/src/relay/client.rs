//! The friend-presence protocol core and the shared connection manager.

use std::sync::Arc;

use gamelink_common::id;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::ClientError;

use super::connection::{EventSink, RelayConnection, RelayEvent};
use super::events::ClientEvent;
use super::invite::InviteCoordinator;
use super::notify::{Navigator, Notice, Notifier};
use super::state::FriendsMirror;

/// Client side of the friends relay: mirrors server-authoritative state and
/// exposes imperative actions for the user-facing surface.
///
/// All actions are rejected with a user-visible notice while disconnected;
/// nothing is queued for later delivery.
pub struct FriendPresenceClient {
    pub(crate) identity: RwLock<Option<String>>,
    pub(crate) mirror: FriendsMirror,
    pub(crate) transport: Arc<dyn EventSink>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) invites: InviteCoordinator,
}

impl FriendPresenceClient {
    /// Build a client over an existing transport. `identity` may start
    /// unknown; the relay announcement is deferred until [`Self::set_identity`].
    pub fn new(
        default_region: impl Into<String>,
        identity: Option<String>,
        transport: Arc<dyn EventSink>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity: RwLock::new(identity),
            mirror: FriendsMirror::new(),
            transport,
            notifier,
            navigator,
            invites: InviteCoordinator::new(default_region),
        })
    }

    /// Consume relay events until the transport is torn down.
    pub async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<RelayEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::debug!("relay event stream ended");
    }

    pub fn username(&self) -> Option<String> {
        self.identity.read().clone()
    }

    pub fn friends(&self) -> Vec<super::events::Friend> {
        self.mirror.friends()
    }

    pub fn pending_requests(&self) -> Vec<super::events::FriendRequest> {
        self.mirror.requests()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Adopt an identity. If the transport is already connected this re-runs
    /// the announcement (`join` + snapshot fetches) immediately.
    pub async fn set_identity(&self, username: impl Into<String>) {
        *self.identity.write() = Some(username.into());
        if self.transport.is_connected() {
            self.announce().await;
        }
    }

    /// Send a friend request. Rejects empty input and self-add locally before
    /// any network call.
    pub async fn add_friend(&self, target: &str) -> Result<(), ClientError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ClientError::Validation("username is required".to_string()));
        }
        let me = self.require_identity()?;
        if target == me {
            self.notifier
                .notify(Notice::error("You cannot add yourself as a friend"))
                .await;
            return Err(ClientError::Validation(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        self.require_connected().await?;

        self.transport.emit(ClientEvent::SendFriendRequest {
            to: target.to_string(),
            from: me,
            request_key: id::request_key(),
        })?;
        self.notifier
            .notify(Notice::info(format!("Friend request sent to {target}")))
            .await;
        Ok(())
    }

    /// Accept a pending request. The removal is optimistic; the shared-room
    /// request is deferred until the relay confirms with `friend-added`.
    /// A second call for an id already removed is a no-op.
    pub async fn accept_friend_request(&self, request_id: &str) -> Result<(), ClientError> {
        let me = self.require_identity()?;
        self.require_connected().await?;

        let Some(request) = self.mirror.take_request(request_id) else {
            return Ok(());
        };
        self.transport.emit(ClientEvent::AcceptFriendRequest {
            from: me,
            to: request.username.clone(),
        })?;
        self.invites.expect_game_start(&request.username);
        Ok(())
    }

    /// Decline a pending request. A call for an id already removed is a no-op.
    pub async fn decline_friend_request(&self, request_id: &str) -> Result<(), ClientError> {
        let me = self.require_identity()?;
        self.require_connected().await?;

        let Some(request) = self.mirror.take_request(request_id) else {
            return Ok(());
        };
        self.transport.emit(ClientEvent::DeclineFriendRequest {
            from: me,
            to: request.username,
        })?;
        Ok(())
    }

    /// Invite a friend into a freshly generated room. Fire-and-forget: no
    /// delivery confirmation beyond the local notice.
    pub async fn invite_friend(&self, friend: &str) -> Result<(), ClientError> {
        let me = self.require_identity()?;
        self.require_connected().await?;

        self.transport.emit(ClientEvent::InviteFriend {
            from: me,
            to: friend.to_string(),
            room_id: id::room_id(),
            region: self.invites.default_region().to_string(),
        })?;
        self.notifier
            .notify(Notice::info(format!("Invite sent to {friend}")))
            .await;
        Ok(())
    }

    fn require_identity(&self) -> Result<String, ClientError> {
        self.identity
            .read()
            .clone()
            .ok_or_else(|| ClientError::Validation("session identity not established".to_string()))
    }

    async fn require_connected(&self) -> Result<(), ClientError> {
        if self.transport.is_connected() {
            return Ok(());
        }
        self.notifier
            .notify(Notice::error("Not connected to the friends service"))
            .await;
        Err(ClientError::NotConnected)
    }
}

struct ActiveClient {
    client: Arc<FriendPresenceClient>,
    connection: Arc<RelayConnection>,
    _task: JoinHandle<()>,
}

/// Owns at most one live client per surface lifetime.
///
/// `acquire` is an atomic create-if-absent: concurrent first mounts share one
/// connection instead of racing a check-then-create. `shutdown` tears down
/// exactly once and clears the slot so a later `acquire` builds a fresh
/// connection.
#[derive(Default)]
pub struct ConnectionManager {
    slot: Mutex<Option<ActiveClient>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live client, creating connection and event loop on first
    /// use. When no identity is supplied a `player_<n>` guest identity is
    /// synthesized once and kept for the session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn acquire(
        &self,
        config: &Config,
        identity: Option<String>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<FriendPresenceClient> {
        let mut slot = self.slot.lock();
        if let Some(active) = slot.as_ref() {
            return active.client.clone();
        }

        let identity = identity.unwrap_or_else(id::guest_username);
        let (connection, events) = RelayConnection::connect(config.clone());
        let sink: Arc<dyn EventSink> = connection.clone();
        let client = FriendPresenceClient::new(
            config.default_region.clone(),
            Some(identity),
            sink,
            notifier,
            navigator,
        );
        let task = tokio::spawn(client.clone().run(events));

        *slot = Some(ActiveClient {
            client: client.clone(),
            connection,
            _task: task,
        });
        client
    }

    /// Re-trigger a connection that exhausted its retry budget.
    pub fn reconnect(&self) {
        if let Some(active) = self.slot.lock().as_ref() {
            active.connection.reconnect();
        }
    }

    /// Tear down the live client, if any. The event loop ends once the
    /// transport task exits and drops its sender.
    pub fn shutdown(&self) {
        if let Some(active) = self.slot.lock().take() {
            active.connection.close();
        }
    }
}
