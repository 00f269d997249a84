//! Owns the connection to the presence service and translates app events into updates

use std::sync::Arc;

use parking_lot::Mutex;

use super::payload::Presence;
use super::traits::{
    ActivityCategory, ClientConnector, ClientError, Observers, PresenceClient, PresenceUser,
};
use crate::settings::PresenceConfig;

const UNKNOWN_USERNAME: &str = "unknown";
const UNKNOWN_DISCRIMINATOR: &str = "0000";

/// Lifecycle wrapper around a single presence client.
///
/// At most one live client exists at a time. `start` on a live client and
/// `set_activity` without one are silent no-ops. Errors from the service are
/// only logged.
pub struct PresenceConnection {
    connector: Arc<dyn ClientConnector>,
    config: Arc<PresenceConfig>,
    handle: Mutex<Option<Box<dyn PresenceClient>>>,
}

impl PresenceConnection {
    pub fn new(connector: Arc<dyn ClientConnector>, config: Arc<PresenceConfig>) -> Self {
        Self {
            connector,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Connect and push the idle presence, unless already connected
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|client| !client.is_disposed()) {
            return;
        }

        let client = self
            .connector
            .connect(self.config.application_id, logging_observers());
        client.initialize();
        client.set_presence(Presence::idle(&self.config));

        *handle = Some(client);
    }

    /// Disconnect and release the client. Safe to call when not started.
    pub fn stop(&self) {
        let client = self.handle.lock().take();
        let user = client.as_ref().and_then(|client| client.current_user());

        tracing::info!("Presence service stopped for {}", display_user(user.as_ref()));

        if let Some(client) = client {
            client.deinitialize();
            client.dispose();
        }
    }

    /// Show the user as browsing `category`
    pub fn set_activity<C: ActivityCategory + ?Sized>(&self, category: &C) {
        let handle = self.handle.lock();
        let Some(client) = handle.as_ref().filter(|client| !client.is_disposed()) else {
            return;
        };

        let label = category.label();
        tracing::debug!("Updating presence activity to {}", label);

        client.update_state(&format!("Browsing {label}"));
        client.update_small_asset(&category.name().to_lowercase(), label);
    }

    /// Whether a live client exists and has completed its handshake
    pub fn is_connected(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .filter(|client| !client.is_disposed())
            .and_then(|client| client.current_user())
            .is_some()
    }
}

fn logging_observers() -> Observers {
    Observers {
        on_ready: Arc::new(|user: &PresenceUser| {
            tracing::info!("Presence service started for {}", user.username);
        }),
        on_error: Arc::new(|error: &ClientError| {
            tracing::error!("Presence service error {}: {}", error.kind, error.message);
        }),
    }
}

fn display_user(user: Option<&PresenceUser>) -> String {
    let username = user.map_or(UNKNOWN_USERNAME, |u| u.username.as_str());
    let discriminator = user
        .and_then(|u| u.discriminator.as_deref())
        .unwrap_or(UNKNOWN_DISCRIMINATOR);
    format!("{username}#{discriminator}")
}
