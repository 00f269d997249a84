mod connection;
mod payload;
mod traits;

pub use connection::PresenceConnection;
pub use payload::{Presence, PresenceAssets, PresenceButton, DEFAULT_STATE};
pub use traits::{
    ActivityCategory, ClientConnector, ClientError, ErrorCallback, ErrorKind, Observers,
    PresenceClient, PresenceUser, ReadyCallback,
};
