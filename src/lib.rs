mod categories;
mod discord;
mod error;
mod logging;
mod presence;
mod settings;

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

pub use categories::{Category, CategoryTable};
pub use discord::{DiscordClient, DiscordConnector};
pub use error::PresenceError;
pub use presence::{
    ActivityCategory, ClientConnector, ClientError, ErrorCallback, ErrorKind, Observers, Presence,
    PresenceAssets, PresenceButton, PresenceClient, PresenceConnection, PresenceUser,
    ReadyCallback, DEFAULT_STATE,
};
pub use settings::{
    get_config_path, load_config, load_config_from, save_config, save_config_to, ButtonConfig,
    PresenceConfig, DEFAULT_APPLICATION_ID, DISCORD_URL, GITHUB_URL, MAX_BUTTONS,
};

/// Time given to the Discord task to clear the activity before the runtime goes away
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Connect to Discord and show whatever category names arrive on stdin
/// until EOF or `quit`.
pub fn run() -> Result<(), PresenceError> {
    let _log_guard = logging::init_logging();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load presence config, using defaults: {}", e);
            PresenceConfig::default()
        }
    };
    let categories = CategoryTable::new(config.categories.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let connector = Arc::new(DiscordConnector::with_runtime(runtime.handle().clone()));
    let connection = PresenceConnection::new(connector, Arc::new(config));

    connection.start();
    let session = run_session(&connection, &categories, std::io::stdin().lock());
    runtime.block_on(tokio::time::sleep(SHUTDOWN_GRACE));

    session.map_err(PresenceError::from)
}

/// Apply category names read from `input` until EOF, `quit` or a read error.
/// The connection is always stopped before returning.
fn run_session<R: BufRead>(
    connection: &PresenceConnection,
    categories: &CategoryTable,
    input: R,
) -> std::io::Result<()> {
    let mut result = Ok(());

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read activity input: {}", e);
                result = Err(e);
                break;
            }
        };

        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "status" => {
                tracing::info!("Presence connected: {}", connection.is_connected());
            }
            name => connection.set_activity(&categories.lookup(name)),
        }
    }

    connection.stop();
    result
}
