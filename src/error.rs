#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("Discord error: {0}")]
    Discord(#[from] discord_sdk::Error),

    #[error("No tokio runtime available to drive the presence connection")]
    NoRuntime,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PresenceError> for String {
    fn from(e: PresenceError) -> Self {
        e.to_string()
    }
}
