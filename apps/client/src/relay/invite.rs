//! Shared-session targets and the invite/auto-join coordination state.

use std::collections::HashSet;

use gamelink_common::id;
use parking_lot::Mutex;

use super::events::{AutoGameStart, GameInvite, GameMode, InviteAccepted};

/// A shared game session both parties navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTarget {
    pub region: String,
    pub room_id: String,
    pub friends_mode: bool,
}

impl GameTarget {
    /// Render the navigation path, `/game?region=<r>&roomId=<id>[&mode=friends]`.
    pub fn path(&self) -> String {
        let mut path = format!("/game?region={}&roomId={}", self.region, self.room_id);
        if self.friends_mode {
            path.push_str("&mode=friends");
        }
        path
    }
}

/// Coordinates the request → accept → auto-join lifecycle: resolves session
/// targets (synthesizing room/region defaults) and tracks which accepted
/// friends still await the relay's `friend-added` confirmation before a
/// shared game start may be requested.
pub struct InviteCoordinator {
    default_region: String,
    pending_starts: Mutex<HashSet<String>>,
}

impl InviteCoordinator {
    pub fn new(default_region: impl Into<String>) -> Self {
        Self {
            default_region: default_region.into(),
            pending_starts: Mutex::new(HashSet::new()),
        }
    }

    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    /// Record that a game start for `username` must wait for the relay to
    /// confirm the friend relationship.
    pub fn expect_game_start(&self, username: &str) {
        self.pending_starts.lock().insert(username.to_string());
    }

    /// Take-once check used when `friend-added` arrives.
    pub fn take_pending_start(&self, username: &str) -> bool {
        self.pending_starts.lock().remove(username)
    }

    pub fn target_from_invite(&self, invite: &GameInvite) -> GameTarget {
        GameTarget {
            region: invite
                .region
                .clone()
                .unwrap_or_else(|| self.default_region.clone()),
            room_id: invite.room_id.clone().unwrap_or_else(id::room_id),
            friends_mode: matches!(invite.mode, Some(GameMode::Friends)),
        }
    }

    /// Convergence on one room relies on the relay echoing the acceptor's
    /// room id here; a synthesized fallback room cannot match the acceptor's.
    pub fn target_from_accept(&self, accepted: &InviteAccepted) -> GameTarget {
        let room_id = accepted.room_id.clone().unwrap_or_else(|| {
            let room_id = id::room_id();
            tracing::warn!(
                peer = %accepted.to,
                room_id = %room_id,
                "invite-accepted carried no room, synthesizing one"
            );
            room_id
        });
        GameTarget {
            region: accepted
                .region
                .clone()
                .unwrap_or_else(|| self.default_region.clone()),
            room_id,
            friends_mode: matches!(accepted.mode, Some(GameMode::Friends)),
        }
    }

    pub fn target_from_auto_start(&self, start: &AutoGameStart) -> GameTarget {
        GameTarget {
            region: start.region.clone(),
            room_id: start.room_id.clone(),
            friends_mode: matches!(start.mode, Some(GameMode::Friends)),
        }
    }
}
