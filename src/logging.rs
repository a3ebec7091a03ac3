//! Tracing setup.
//!
//! The TUI owns the terminal, so the dashboard writes one file per run under
//! `~/.flutterlens/logs/`. Runs older than the retention window are pruned at
//! startup. `--health` and `--sync` print to stdout and log to stderr.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file name prefix.
const LOG_PREFIX: &str = "flutterlens_";

/// Hours a run's log is kept by default.
pub const DEFAULT_LOG_RETENTION_HOURS: u64 = 24;

/// Level used when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

/// Logging settings from the rc file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// How long a run's log file is kept.
    pub retention: Duration,
    /// Maximum level written.
    pub level: LevelFilter,
    /// File logging switch.
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(DEFAULT_LOG_RETENTION_HOURS * 3600),
            level: DEFAULT_LOG_LEVEL,
            enabled: true,
        }
    }
}

impl LogConfig {
    /// Reads a level name. Unknown names return `None`.
    #[must_use]
    pub fn parse_level(value: &str) -> Option<LevelFilter> {
        match value.trim().to_lowercase().as_str() {
            "warning" => Some(LevelFilter::WARN),
            "none" | "disabled" => Some(LevelFilter::OFF),
            other => other.parse().ok(),
        }
    }

    /// Reads a retention period given in hours.
    #[must_use]
    pub fn parse_retention(value: &str) -> Option<Duration> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
    }

    /// Returns true if nothing should be logged.
    #[must_use]
    pub fn is_off(&self) -> bool {
        !self.enabled || self.level == LevelFilter::OFF
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy()
    }
}

/// Directory holding run logs.
#[must_use]
pub fn log_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".flutterlens")
        .join("logs")
}

/// Log file name for a run started at `started`.
#[must_use]
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("{}{}.log", LOG_PREFIX, started.format("%Y-%m-%d_%H-%M-%S"))
}

fn is_run_log(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_PREFIX))
}

/// Deletes run logs in `dir` last modified more than `retention` before `now`.
///
/// Other files are left alone. A missing directory prunes nothing.
///
/// # Errors
/// Returns error if the directory exists but cannot be listed.
pub fn prune_logs(dir: &Path, retention: Duration, now: SystemTime) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let expired = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_run_log(path))
        .filter(|path| {
            fs::metadata(path)
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > retention)
        })
        .filter(|path| fs::remove_file(path).is_ok())
        .count();

    Ok(expired)
}

/// Starts file logging for the dashboard and returns the run's log path.
///
/// Returns `None` when logging is switched off. `RUST_LOG` overrides the
/// configured level.
///
/// # Errors
/// Returns error if the log directory or file cannot be created.
pub fn init(config: &LogConfig) -> io::Result<Option<PathBuf>> {
    if config.is_off() {
        return Ok(None);
    }

    let dir = log_directory();
    fs::create_dir_all(&dir)?;
    let pruned = prune_logs(&dir, config.retention, SystemTime::now())?;

    let path = dir.join(log_file_name(Local::now()));
    let file = File::create(&path)?;

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();

    info!("[LOG] Writing {} at {}", path.display(), config.level);
    if pruned > 0 {
        debug!("[LOG] Pruned {} expired log file(s)", pruned);
    }
    Ok(Some(path))
}

/// Starts stderr logging for one-shot commands, warnings and up by default.
pub fn init_stderr(config: &LogConfig) {
    if config.is_off() {
        return;
    }

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_level() {
        assert_eq!(LogConfig::parse_level("debug"), Some(LevelFilter::DEBUG));
        assert_eq!(LogConfig::parse_level(" WARNING "), Some(LevelFilter::WARN));
        assert_eq!(LogConfig::parse_level("none"), Some(LevelFilter::OFF));
        assert_eq!(LogConfig::parse_level("loud"), None);
    }

    #[test]
    fn test_parse_retention() {
        assert_eq!(
            LogConfig::parse_retention("48"),
            Some(Duration::from_secs(48 * 3600))
        );
        assert_eq!(LogConfig::parse_retention("forever"), None);
    }

    #[test]
    fn test_is_off() {
        assert!(!LogConfig::default().is_off());

        let silent = LogConfig {
            level: LevelFilter::OFF,
            ..LogConfig::default()
        };
        assert!(silent.is_off());

        let disabled = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(disabled.is_off());
    }

    #[test]
    fn test_log_file_name() {
        let started = Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(log_file_name(started), "flutterlens_2025-03-09_14-05-00.log");
        assert!(log_directory().ends_with(".flutterlens/logs"));
    }

    #[test]
    fn test_prune_logs_removes_only_expired_run_logs() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("flutterlens_2020-01-01_00-00-00.log");
        let fresh = dir.path().join("flutterlens_2020-01-02_00-00-00.log");
        let other = dir.path().join("notes.log");
        for path in [&old, &fresh, &other] {
            File::create(path).unwrap();
        }

        let now = SystemTime::now();
        let day = Duration::from_secs(24 * 3600);
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(now - 2 * day)
            .unwrap();
        File::options()
            .write(true)
            .open(&other)
            .unwrap()
            .set_modified(now - 2 * day)
            .unwrap();

        let pruned = prune_logs(dir.path(), day, now).unwrap();

        assert_eq!(pruned, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_prune_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert_eq!(
            prune_logs(&missing, Duration::ZERO, SystemTime::now()).unwrap(),
            0
        );
    }
}
