//! Inbound event routing: one state-update rule plus declared side effect
//! per relay event.

use super::client::FriendPresenceClient;
use super::connection::RelayEvent;
use super::events::{ClientEvent, GameInvite, ServerEvent};
use super::notify::Notice;

impl FriendPresenceClient {
    pub(crate) async fn handle_event(&self, event: RelayEvent) {
        match event {
            RelayEvent::Connected => self.announce().await,
            // Mirrors stay stale until a reconnect refreshes them.
            RelayEvent::Disconnected => tracing::info!("relay disconnected"),
            RelayEvent::ConnectError(reason) => {
                tracing::debug!(%reason, "relay connect error");
            }
            RelayEvent::Server(event) => self.handle_server_event(event).await,
        }
    }

    /// Announce the local identity and fetch both snapshots. Deferred until
    /// identity is known; re-run on every reconnect and identity change.
    pub(crate) async fn announce(&self) {
        let Some(me) = self.identity.read().clone() else {
            tracing::debug!("connected without identity, deferring join");
            return;
        };
        for event in [
            ClientEvent::Join(me.clone()),
            ClientEvent::GetFriends(me.clone()),
            ClientEvent::GetFriendRequests(me),
        ] {
            if let Err(e) = self.transport.emit(event) {
                tracing::debug!(error = %e, "failed to announce to relay");
                return;
            }
        }
    }

    async fn handle_server_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::OnlineUsers(users) => {
                self.mirror.set_online_users(users);
            }
            ServerEvent::FriendRequest(request) => {
                if self.mirror.insert_request(request.clone()) {
                    self.notifier.notify(Notice::friend_request(request)).await;
                }
            }
            ServerEvent::FriendAdded { username } => {
                self.mirror.insert_friend(&username);
                if self.invites.take_pending_start(&username) {
                    self.request_game_start(&username);
                }
            }
            ServerEvent::FriendsList(friends) => {
                self.mirror.set_friends(friends);
            }
            ServerEvent::FriendRequests(requests) => {
                self.mirror.set_requests(requests);
            }
            ServerEvent::GameInvite(invite) => {
                self.handle_game_invite(invite).await;
            }
            ServerEvent::InviteAccepted(accepted) => {
                let target = self.invites.target_from_accept(&accepted);
                tracing::info!(path = %target.path(), peer = %accepted.to, "invite accepted, joining shared room");
                self.navigator.navigate(&target);
            }
            ServerEvent::AutoGameStart(start) => {
                let target = self.invites.target_from_auto_start(&start);
                tracing::info!(path = %target.path(), friend = %start.friend, "auto game start");
                self.navigator.navigate(&target);
            }
            ServerEvent::Unknown => {}
        }
    }

    /// The relay confirmed a `friend-added` we were waiting on; request the
    /// shared room now that the relationship write is known to be complete.
    fn request_game_start(&self, username: &str) {
        let Some(me) = self.identity.read().clone() else {
            return;
        };
        let event = ClientEvent::StartGameWithFriend {
            from: me,
            to: username.to_string(),
            region: self.invites.default_region().to_string(),
        };
        if let Err(e) = self.transport.emit(event) {
            tracing::debug!(error = %e, "failed to request shared game start");
        }
    }

    async fn handle_game_invite(&self, invite: GameInvite) {
        if !self.notifier.confirm_invite(&invite).await {
            tracing::debug!(from = %invite.from, "game invite declined");
            return;
        }
        let Some(me) = self.identity.read().clone() else {
            return;
        };
        let target = self.invites.target_from_invite(&invite);
        let ack = ClientEvent::AcceptInvite {
            from: me,
            to: invite.from.clone(),
            room_id: target.room_id.clone(),
            region: target.region.clone(),
            mode: invite.mode.clone(),
        };
        if let Err(e) = self.transport.emit(ack) {
            tracing::debug!(error = %e, "failed to acknowledge game invite");
        }
        self.navigator.navigate(&target);
    }
}
