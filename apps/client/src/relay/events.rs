//! Relay wire format: named events and their payload shapes.
//!
//! Every frame on the wire is a JSON envelope `{"event": <name>, "data": ...}`
//! with kebab-case event names, modelled here as adjacently tagged enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared payload types
// ---------------------------------------------------------------------------

/// Game mode carried on invites and session starts. Only `friends` has
/// client-side meaning; anything else is relayed opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Friends,
    #[serde(untagged)]
    Other(String),
}

/// A friend as mirrored from the relay. `is_online`/`is_playing` are derived
/// from server pushes and are not locally authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    /// Equal to the username on this relay.
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_playing: bool,
}

/// A pending incoming friend request. Ephemeral: lives from receipt until
/// accept/decline, never persisted beyond the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: String,
    /// The requester.
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

/// An incoming invitation to join a shared game room. Missing fields are
/// synthesized by the acceptor (fresh room id, default region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInvite {
    pub from: String,
    #[serde(default, rename = "roomId", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
}

/// Sent to the original inviter once the peer accepted; both parties must
/// converge on the same room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteAccepted {
    pub to: String,
    #[serde(default, rename = "roomId", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
}

/// Pushed after a friend-request acceptance auto-created a shared room.
/// Navigated to immediately, without confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoGameStart {
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub region: String,
    pub friend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
}

// ---------------------------------------------------------------------------
// Client → relay events
// ---------------------------------------------------------------------------

/// Outbound named events, client perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Announce the session identity to the relay.
    Join(String),
    /// Request a `friends-list` snapshot.
    GetFriends(String),
    /// Request a `friend-requests` snapshot.
    GetFriendRequests(String),
    /// `request_key` is an idempotency key; the relay drops duplicates.
    SendFriendRequest {
        to: String,
        from: String,
        #[serde(rename = "requestKey")]
        request_key: String,
    },
    /// `from` is the local user performing the action, `to` the requester.
    AcceptFriendRequest { from: String, to: String },
    /// `from` is the local user performing the action, `to` the requester.
    DeclineFriendRequest { from: String, to: String },
    InviteFriend {
        from: String,
        to: String,
        #[serde(rename = "roomId")]
        room_id: String,
        region: String,
    },
    AcceptInvite {
        from: String,
        to: String,
        #[serde(rename = "roomId")]
        room_id: String,
        region: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<GameMode>,
    },
    /// Requested only after the relay confirmed the relationship with
    /// `friend-added`.
    StartGameWithFriend {
        from: String,
        to: String,
        region: String,
    },
}

// ---------------------------------------------------------------------------
// Relay → client events
// ---------------------------------------------------------------------------

/// Inbound named events. Unrecognized event names deserialize to `Unknown`
/// (whatever payload they carry) and are dropped rather than failing the
/// read loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full presence set, rebroadcast wholesale on every change.
    OnlineUsers(Vec<String>),
    FriendRequest(FriendRequest),
    FriendAdded { username: String },
    FriendsList(Vec<Friend>),
    FriendRequests(Vec<FriendRequest>),
    GameInvite(GameInvite),
    InviteAccepted(InviteAccepted),
    AutoGameStart(AutoGameStart),
    Unknown,
}

// Hand-written: a derived tagged enum can only absorb an unknown tag when the
// envelope carries no payload, but unknown events on this relay usually do.
// The envelope is read first; only recognized names parse their payload.
impl<'de> Deserialize<'de> for ServerEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            event: String,
            #[serde(default)]
            data: serde_json::Value,
        }

        #[derive(Deserialize)]
        struct FriendAddedData {
            username: String,
        }

        let Envelope { event, data } = Envelope::deserialize(deserializer)?;
        let parsed = match event.as_str() {
            "online-users" => serde_json::from_value(data).map(ServerEvent::OnlineUsers),
            "friend-request" => serde_json::from_value(data).map(ServerEvent::FriendRequest),
            "friend-added" => serde_json::from_value(data)
                .map(|FriendAddedData { username }| ServerEvent::FriendAdded { username }),
            "friends-list" => serde_json::from_value(data).map(ServerEvent::FriendsList),
            "friend-requests" => serde_json::from_value(data).map(ServerEvent::FriendRequests),
            "game-invite" => serde_json::from_value(data).map(ServerEvent::GameInvite),
            "invite-accepted" => serde_json::from_value(data).map(ServerEvent::InviteAccepted),
            "auto-game-start" => serde_json::from_value(data).map(ServerEvent::AutoGameStart),
            _ => Ok(ServerEvent::Unknown),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
