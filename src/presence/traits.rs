use std::fmt;
use std::sync::Arc;

use super::payload::Presence;

/// The account a presence connection is signed in as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUser {
    pub username: String,
    pub discriminator: Option<String>,
}

/// Category of error reported by a presence client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionFailed,
    HandshakeTimeout,
    Disconnected,
    UpdateFailed,
    RuntimeUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ConnectionFailed => "ConnectionFailed",
            ErrorKind::HandshakeTimeout => "HandshakeTimeout",
            ErrorKind::Disconnected => "Disconnected",
            ErrorKind::UpdateFailed => "UpdateFailed",
            ErrorKind::RuntimeUnavailable => "RuntimeUnavailable",
        };
        f.write_str(name)
    }
}

/// Error delivered to the error observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type ReadyCallback = Arc<dyn Fn(&PresenceUser) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Callback slots registered on a client when it is constructed.
///
/// Both fire on whatever thread or task the client uses internally.
#[derive(Clone)]
pub struct Observers {
    pub on_ready: ReadyCallback,
    pub on_error: ErrorCallback,
}

impl Observers {
    pub fn ready(&self, user: &PresenceUser) {
        (self.on_ready)(user);
    }

    pub fn error(&self, error: &ClientError) {
        (self.on_error)(error);
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").finish_non_exhaustive()
    }
}

/// A connection to an external presence service (Discord, or a fake in tests)
pub trait PresenceClient: Send + Sync {
    /// Open the underlying transport
    fn initialize(&self);

    /// Replace the whole presence payload
    fn set_presence(&self, presence: Presence);

    /// Replace only the state line of the current payload
    fn update_state(&self, state: &str);

    /// Replace only the small image of the current payload
    fn update_small_asset(&self, key: &str, tooltip: &str);

    /// Close the transport, clearing the presence shown to others
    fn deinitialize(&self);

    /// Release everything the client holds. No calls are accepted afterwards.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;

    /// The connected account, if the handshake has completed
    fn current_user(&self) -> Option<PresenceUser>;
}

/// Constructs presence clients for an application id
pub trait ClientConnector: Send + Sync {
    fn connect(&self, application_id: i64, observers: Observers) -> Box<dyn PresenceClient>;
}

/// Something the host application can show as the current activity
pub trait ActivityCategory {
    /// Identifier of the category, lowercased to form the small image key
    fn name(&self) -> &str;

    /// Human readable label
    fn label(&self) -> &str;
}
