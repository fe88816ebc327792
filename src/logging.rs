//! Logging setup for hosts embedding the filter
//!
//! The filter itself only emits `tracing` events; hosts that do not install
//! their own subscriber can call [`init_logging`] once at startup.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file path environment variable
pub const LOG_FILE_ENV: &str = "PROTOCOL_FILTER_LOG_FILE";

/// When "true", the process ID is appended to the log file name
pub const LOG_UNIQUE_ENV: &str = "PROTOCOL_FILTER_LOG_UNIQUE";

/// When "true", logs are written as JSON
pub const LOG_JSON_ENV: &str = "PROTOCOL_FILTER_LOG_JSON";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (e.g., "debug", "info", "warn", "error")
    pub level: String,
    /// Optional log file path. If None, logs only to stderr
    pub file_path: Option<PathBuf>,
    /// Whether to use structured JSON format for logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create LogConfig from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let unique = lookup(LOG_UNIQUE_ENV).unwrap_or_default() == "true";

        let file_path = lookup(LOG_FILE_ENV).map(|path| {
            let path_buf = PathBuf::from(path);
            if unique {
                unique_log_path(path_buf, std::process::id())
            } else {
                path_buf
            }
        });

        let json_format = lookup(LOG_JSON_ENV).unwrap_or_default() == "true";

        Self {
            level,
            file_path,
            json_format,
        }
    }

    /// Override values from host-provided settings
    pub fn with_overrides(mut self, level: Option<String>, file_path: Option<PathBuf>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(file_path) = file_path {
            self.file_path = Some(file_path);
        }
        self
    }
}

/// Insert the process ID between the file stem and its extension
fn unique_log_path(mut path_buf: PathBuf, pid: u32) -> PathBuf {
    if let Some(filename) = path_buf.file_stem() {
        let extension = path_buf
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let unique_filename = if extension.is_empty() {
            format!("{}.{}", filename.to_string_lossy(), pid)
        } else {
            format!("{}.{}.{}", filename.to_string_lossy(), pid, extension)
        };

        path_buf.set_file_name(unique_filename);
    }
    path_buf
}

/// Initialize the logging system based on configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match (&config.file_path, config.json_format) {
        (Some(file_path), true) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);

            subscriber.with(file_layer).try_init()?;
        }
        (Some(file_path), false) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);

            subscriber.with(file_layer).try_init()?;
        }
        (None, true) => {
            let stderr_layer = fmt::layer().json().with_writer(io::stderr).with_ansi(false);

            subscriber.with(stderr_layer).try_init()?;
        }
        (None, false) => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);

            subscriber.with(stderr_layer).try_init()?;
        }
    }

    Ok(())
}

/// Log a forwarded or suppressed LSP message in one structured line
#[macro_export]
macro_rules! log_lsp_message {
    ($level:expr, $direction:expr, $method:expr, $backend:expr) => {
        tracing::event!(
            $level,
            direction = $direction,
            method = $method,
            backend = %$backend,
            "LSP message"
        );
    };
}

/// Log performance timing
#[macro_export]
macro_rules! log_timing {
    ($level:expr, $operation:expr, $duration:expr) => {
        tracing::event!(
            $level,
            operation = $operation,
            duration_ms = $duration.as_millis(),
            pid = std::process::id(),
            "Performance timing"
        );
    };
}
