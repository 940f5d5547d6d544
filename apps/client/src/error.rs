use std::fmt;

/// Errors surfaced by the relay client and its HTTP collaborators.
///
/// Transport and HTTP failures are converted to user-facing notices at the
/// call site; nothing here is allowed to crash the surface.
#[derive(Debug)]
pub enum ClientError {
    /// The relay transport is not currently connected. Actions are rejected,
    /// not queued.
    NotConnected,
    /// A user action was rejected locally before any network call.
    Validation(String),
    /// The relay transport failed.
    Transport(String),
    /// The remote service declined an action.
    RemoteRejection(String),
    /// An HTTP collaborator request failed.
    Request(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::NotConnected => write!(f, "not connected to the friends service"),
            ClientError::Validation(message) => write!(f, "{message}"),
            ClientError::Transport(message) => write!(f, "transport error: {message}"),
            ClientError::RemoteRejection(message) => write!(f, "{message}"),
            ClientError::Request(err) => write!(f, "request failed: {err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(err)
    }
}
