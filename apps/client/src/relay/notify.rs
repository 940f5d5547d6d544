//! Capability interfaces the UI layer implements: user-facing notifications
//! and navigation into a shared game session.

use std::time::Duration;

use async_trait::async_trait;

use super::events::{FriendRequest, GameInvite};
use super::invite::GameTarget;

/// How long an unacted friend-request notification stays on screen.
pub const FRIEND_REQUEST_NOTICE_TTL: Duration = Duration::from_secs(10);

/// A user-facing notice emitted by the protocol core.
#[derive(Debug, Clone)]
pub enum Notice {
    Info { message: String },
    Error { message: String },
    /// Actionable: the surface offers Accept/Decline inline and auto-dismisses
    /// after `auto_dismiss` if unacted.
    FriendRequest {
        request: FriendRequest,
        auto_dismiss: Duration,
    },
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice::Info {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error {
            message: message.into(),
        }
    }

    pub fn friend_request(request: FriendRequest) -> Self {
        Notice::FriendRequest {
            request,
            auto_dismiss: FRIEND_REQUEST_NOTICE_TTL,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);

    /// Ask the user whether to join an incoming game invite.
    async fn confirm_invite(&self, invite: &GameInvite) -> bool;
}

/// Navigation into a shared session. Called synchronously from event handling
/// and expected to interrupt whatever view is current.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &GameTarget);
}
