use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::APP_DIR;

const LOG_FILE_PREFIX: &str = "porting-presence.log";
const LOG_RETENTION_DAYS: u64 = 7;

/// discord-sdk logs every reconnect attempt at info
const DEFAULT_LOG_FILTER: &str = "info,discord_sdk=warn";

/// Install console and daily-rolling file logging. Keep the guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging() -> WorkerGuard {
    let log_dir = get_log_directory();

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        "Porting presence {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );

    let removed = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS);
    if removed > 0 {
        tracing::debug!("Removed {} expired log files", removed);
    }

    guard
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn get_log_directory() -> PathBuf {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs");

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    log_dir
}

/// Remove rotated log files older than `keep_days`, returning how many went
fn cleanup_old_logs(log_dir: &Path, keep_days: u64) -> usize {
    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read log directory for cleanup: {}", e);
            return 0;
        }
    };

    let now = SystemTime::now();
    let max_age = Duration::from_secs(keep_days.saturating_mul(24 * 60 * 60));

    entries
        .flatten()
        .filter(|entry| entry.file_name().to_str().is_some_and(is_rotated_log))
        .filter(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .is_ok_and(|modified| is_expired(modified, now, max_age))
        })
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove old log file {:?}: {}", entry.path(), e);
                false
            }
        })
        .count()
}

fn is_rotated_log(filename: &str) -> bool {
    filename.starts_with(LOG_FILE_PREFIX) && filename != LOG_FILE_PREFIX
}

fn is_expired(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    now.duration_since(modified)
        .is_ok_and(|age| age >= max_age)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_is_rotated_log() {
        assert!(is_rotated_log("porting-presence.log.2026-10-01"));
        assert!(!is_rotated_log("porting-presence.log"));
        assert!(!is_rotated_log("settings.json"));
    }

    #[test]
    fn test_is_expired() {
        let now = SystemTime::now();
        assert!(is_expired(now - DAY * 8, now, DAY * 7));
        assert!(!is_expired(now - DAY, now, DAY * 7));
        // Clock skew: modified in the future never expires
        assert!(!is_expired(now + DAY, now, Duration::ZERO));
    }

    #[test]
    fn test_cleanup_only_removes_rotated_logs() {
        let dir = std::env::temp_dir().join(format!("presence-logs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let rotated = dir.join("porting-presence.log.2026-10-16");
        let current = dir.join("porting-presence.log");
        let other = dir.join("notes.txt");
        for path in [&rotated, &current, &other] {
            std::fs::write(path, "log").unwrap();
        }

        assert_eq!(cleanup_old_logs(&dir, 7), 0);
        assert!(rotated.exists());

        assert_eq!(cleanup_old_logs(&dir, 0), 1);
        assert!(!rotated.exists());
        assert!(current.exists());
        assert!(other.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_removes_nothing() {
        let dir = std::env::temp_dir().join(format!("presence-missing-{}", uuid::Uuid::new_v4()));
        assert_eq!(cleanup_old_logs(&dir, 0), 0);
    }
}
