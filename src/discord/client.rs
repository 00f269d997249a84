//! Discord Rich Presence client using discord-sdk

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use discord_sdk::{
    activity::{ActivityBuilder, Assets, Button},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::PresenceError;
use crate::presence::{
    ClientConnector, ClientError, ErrorKind, Observers, Presence, PresenceClient, PresenceUser,
};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
enum Command {
    SetPresence(Presence),
    UpdateState(String),
    UpdateSmallAsset { key: String, tooltip: String },
    Shutdown,
}

/// Builds [`DiscordClient`]s that run on a tokio runtime
#[derive(Debug, Clone)]
pub struct DiscordConnector {
    runtime: Option<Handle>,
}

impl DiscordConnector {
    /// Use the runtime of the calling context, if there is one
    pub fn new() -> Self {
        Self {
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }
}

impl Default for DiscordConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConnector for DiscordConnector {
    fn connect(&self, application_id: i64, observers: Observers) -> Box<dyn PresenceClient> {
        Box::new(DiscordClient::new(
            application_id,
            observers,
            self.runtime.clone(),
        ))
    }
}

/// A single Discord IPC connection.
///
/// All SDK work happens on a background task. Calls only queue commands,
/// which are applied once the handshake has completed.
pub struct DiscordClient {
    application_id: i64,
    observers: Observers,
    runtime: Option<Handle>,
    update_tx: Mutex<Option<mpsc::UnboundedSender<Command>>>,
    user: Arc<RwLock<Option<PresenceUser>>>,
    disposed: AtomicBool,
}

impl DiscordClient {
    pub fn new(application_id: i64, observers: Observers, runtime: Option<Handle>) -> Self {
        Self {
            application_id,
            observers,
            runtime,
            update_tx: Mutex::new(None),
            user: Arc::new(RwLock::new(None)),
            disposed: AtomicBool::new(false),
        }
    }

    fn send(&self, command: Command) {
        if self.is_disposed() {
            return;
        }

        match self.update_tx.lock().as_ref() {
            Some(tx) => {
                let _ = tx.send(command);
            }
            None => tracing::debug!("Discord client not initialized, dropping {:?}", command),
        }
    }
}

impl PresenceClient for DiscordClient {
    fn initialize(&self) {
        if self.is_disposed() {
            return;
        }

        let mut update_tx = self.update_tx.lock();
        if update_tx.is_some() {
            return;
        }

        let Some(runtime) = &self.runtime else {
            self.observers.error(&ClientError::new(
                ErrorKind::RuntimeUnavailable,
                PresenceError::NoRuntime.to_string(),
            ));
            return;
        };

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_discord_task(
            self.application_id,
            self.observers.clone(),
            Arc::clone(&self.user),
            rx,
        ));
        *update_tx = Some(tx);
    }

    fn set_presence(&self, presence: Presence) {
        self.send(Command::SetPresence(presence));
    }

    fn update_state(&self, state: &str) {
        self.send(Command::UpdateState(state.to_string()));
    }

    fn update_small_asset(&self, key: &str, tooltip: &str) {
        self.send(Command::UpdateSmallAsset {
            key: key.to_string(),
            tooltip: tooltip.to_string(),
        });
    }

    fn deinitialize(&self) {
        if let Some(tx) = self.update_tx.lock().take() {
            let _ = tx.send(Command::Shutdown);
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.deinitialize();
        *self.user.write() = None;
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<PresenceUser> {
        self.user.read().clone()
    }
}

/// Background task that maintains the Discord connection and processes presence updates
async fn run_discord_task(
    application_id: i64,
    observers: Observers,
    user_slot: Arc<RwLock<Option<PresenceUser>>>,
    mut update_rx: mpsc::UnboundedReceiver<Command>,
) {
    let error_observers = observers.clone();
    let (wheel, handler) = Wheel::new(Box::new(move |err| {
        error_observers.error(&ClientError::new(
            ErrorKind::ConnectionFailed,
            format!("{err:?}"),
        ));
    }));

    let mut user_spoke = wheel.user();

    let discord = match Discord::new(application_id, Subscriptions::ACTIVITY, Box::new(handler)) {
        Ok(d) => d,
        Err(e) => {
            observers.error(&ClientError::new(
                ErrorKind::ConnectionFailed,
                PresenceError::from(e).to_string(),
            ));
            return;
        }
    };

    tracing::debug!("Discord connecting...");

    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
        if user_spoke.0.changed().await.is_err() {
            return Err(ClientError::new(
                ErrorKind::Disconnected,
                "Discord connection closed",
            ));
        }
        let state = match &*user_spoke.0.borrow() {
            UserState::Connected(user) => Ok(PresenceUser {
                username: user.username.clone(),
                discriminator: user.discriminator.map(|d| d.to_string()),
            }),
            UserState::Disconnected(err) => Err(ClientError::new(
                ErrorKind::Disconnected,
                format!("Discord disconnected: {err:?}"),
            )),
        };
        state
    })
    .await;

    let user = match handshake {
        Ok(Ok(user)) => user,
        Ok(Err(error)) => {
            observers.error(&error);
            discord.disconnect().await;
            return;
        }
        Err(_) => {
            observers.error(&ClientError::new(
                ErrorKind::HandshakeTimeout,
                format!(
                    "Discord handshake timed out after {}s",
                    HANDSHAKE_TIMEOUT.as_secs()
                ),
            ));
            discord.disconnect().await;
            return;
        }
    };

    *user_slot.write() = Some(user.clone());
    observers.ready(&user);

    let user_status = user_spoke.0.clone();

    // Last payload sent, resent whole on every change
    let mut activity: Option<Presence> = None;

    loop {
        tokio::select! {
            command = update_rx.recv() => {
                let Some(command) = command else { break };
                if !apply_command(&mut activity, command) {
                    break;
                }

                if let Some(presence) = &activity {
                    if let Err(e) = discord.update_activity(build_activity(presence)).await {
                        observers.error(&ClientError::new(ErrorKind::UpdateFailed, e.to_string()));
                    }
                }
            }
            changed = user_spoke.0.changed() => {
                if changed.is_err() {
                    observers.error(&ClientError::new(
                        ErrorKind::Disconnected,
                        "Discord connection closed",
                    ));
                    break;
                }

                let state = match &*user_status.borrow() {
                    UserState::Connected(user) => Ok(PresenceUser {
                        username: user.username.clone(),
                        discriminator: user.discriminator.map(|d| d.to_string()),
                    }),
                    UserState::Disconnected(err) => Err(format!("Discord disconnected: {err:?}")),
                };

                match state {
                    Ok(user) => {
                        *user_slot.write() = Some(user.clone());
                        observers.ready(&user);

                        // The SDK reconnects on its own but the activity has to be sent again
                        if let Some(presence) = &activity {
                            if let Err(e) = discord.update_activity(build_activity(presence)).await {
                                observers.error(&ClientError::new(ErrorKind::UpdateFailed, e.to_string()));
                            }
                        }
                    }
                    Err(message) => {
                        *user_slot.write() = None;
                        observers.error(&ClientError::new(ErrorKind::Disconnected, message));
                    }
                }
            }
        }
    }

    *user_slot.write() = None;

    if let Err(e) = discord.clear_activity().await {
        tracing::debug!("Failed to clear Discord activity: {:?}", e);
    }
    discord.disconnect().await;
    tracing::info!("Discord Rich Presence disconnected");
}

/// Fold a command into the last payload. Returns `false` on shutdown.
fn apply_command(activity: &mut Option<Presence>, command: Command) -> bool {
    match command {
        Command::Shutdown => return false,
        Command::SetPresence(presence) => *activity = Some(presence),
        Command::UpdateState(state) => {
            activity.get_or_insert_with(Presence::default).state = state;
        }
        Command::UpdateSmallAsset { key, tooltip } => {
            activity
                .get_or_insert_with(Presence::default)
                .set_small_asset(&key, &tooltip);
        }
    }
    true
}

fn build_activity(presence: &Presence) -> ActivityBuilder {
    let mut activity = ActivityBuilder::new().state(presence.state.clone());

    let mut assets = Assets::default();
    if let Some(key) = &presence.assets.large_image {
        assets = assets.large(key.clone(), presence.assets.large_text.clone());
    }
    if let Some(key) = &presence.assets.small_image {
        assets = assets.small(key.clone(), presence.assets.small_text.clone());
    }
    activity = activity.assets(assets);

    if let Some(started_at) = presence.started_at {
        activity = activity.start_timestamp(SystemTime::from(started_at));
    }

    for button in &presence.buttons {
        activity = activity.button(Button {
            label: button.label.clone(),
            url: button.url.clone(),
        });
    }

    activity
}
