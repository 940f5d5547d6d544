//! Local mirrors of server-authoritative friend/presence/request state.
//!
//! The relay rebroadcasts snapshots wholesale; the mirror is a last-known-good
//! cache replaced on every snapshot event. Optimistic removals of pending
//! requests are tracked until the next snapshot resets them.

use std::collections::HashSet;

use parking_lot::RwLock;

use super::events::{Friend, FriendRequest};

#[derive(Default)]
struct MirrorInner {
    online: HashSet<String>,
    friends: Vec<Friend>,
    requests: Vec<FriendRequest>,
    /// Ids removed optimistically (accept/decline) that have not yet been
    /// confirmed by a `friend-requests` snapshot.
    removed_requests: HashSet<String>,
}

/// Lock-backed registry of the friends surface state.
#[derive(Default)]
pub struct FriendsMirror {
    inner: RwLock<MirrorInner>,
}

impl FriendsMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the online set wholesale and recompute `is_online` for every
    /// known friend by membership test.
    pub fn set_online_users(&self, users: Vec<String>) {
        let mut inner = self.inner.write();
        inner.online = users.into_iter().collect();
        let MirrorInner {
            online, friends, ..
        } = &mut *inner;
        for friend in friends.iter_mut() {
            friend.is_online = online.contains(&friend.username);
        }
    }

    /// Append a pending request. Returns false (no-op) when the id is already
    /// pending or was optimistically removed earlier this session.
    pub fn insert_request(&self, request: FriendRequest) -> bool {
        let mut inner = self.inner.write();
        if inner.removed_requests.contains(&request.id)
            || inner.requests.iter().any(|r| r.id == request.id)
        {
            return false;
        }
        inner.requests.push(request);
        true
    }

    /// Insert a friend pushed by the relay. Returns false when the username
    /// already exists. `is_online` is derived from the current online set.
    pub fn insert_friend(&self, username: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.friends.iter().any(|f| f.username == username) {
            return false;
        }
        let is_online = inner.online.contains(username);
        inner.friends.push(Friend {
            id: username.to_string(),
            username: username.to_string(),
            is_online,
            is_playing: false,
        });
        true
    }

    /// Replace the friends mirror wholesale with a server snapshot.
    pub fn set_friends(&self, friends: Vec<Friend>) {
        self.inner.write().friends = friends;
    }

    /// Replace the pending-requests mirror wholesale. The snapshot is the new
    /// last-known-good, so pending optimistic removals are reset.
    pub fn set_requests(&self, requests: Vec<FriendRequest>) {
        let mut inner = self.inner.write();
        inner.requests = requests;
        inner.removed_requests.clear();
    }

    /// Optimistically remove a pending request by id. Returns `None` when the
    /// id is not pending, making repeat accept/decline calls a no-op.
    pub fn take_request(&self, id: &str) -> Option<FriendRequest> {
        let mut inner = self.inner.write();
        let pos = inner.requests.iter().position(|r| r.id == id)?;
        let request = inner.requests.remove(pos);
        inner.removed_requests.insert(request.id.clone());
        Some(request)
    }

    pub fn friends(&self) -> Vec<Friend> {
        self.inner.read().friends.clone()
    }

    pub fn requests(&self) -> Vec<FriendRequest> {
        self.inner.read().requests.clone()
    }

    pub fn is_online(&self, username: &str) -> bool {
        self.inner.read().online.contains(username)
    }
}
