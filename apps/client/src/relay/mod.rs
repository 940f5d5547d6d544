//! Client side of the friends relay: wire format, transport, local mirrors,
//! and the invite/auto-join coordination.

pub mod client;
pub mod connection;
pub mod events;
mod handler;
pub mod invite;
pub mod notify;
pub mod state;

pub use client::{ConnectionManager, FriendPresenceClient};
pub use connection::{ConnectionState, EventSink, RelayConnection, RelayEvent};
pub use events::{
    AutoGameStart, ClientEvent, Friend, FriendRequest, GameInvite, GameMode, InviteAccepted,
    ServerEvent,
};
pub use invite::{GameTarget, InviteCoordinator};
pub use notify::{Navigator, Notice, Notifier, FRIEND_REQUEST_NOTICE_TTL};
pub use state::FriendsMirror;
