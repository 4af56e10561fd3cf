//! Global `tracing` subscriber for the application.
//!
//! Gesture transitions are logged at `debug`, start-up and shutdown at
//! `info`, failed actuator calls at `warn`.  Stdout always gets the compact
//! text format; with `ENABLE_FILE_LOGS` each run also appends JSON lines to
//! `LOG_DIR/hand-pointer.<date>.log`, rotated daily, last 30 kept.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_PREFIX: &str = "hand-pointer";
const KEPT_LOG_FILES:  usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `hand_signal=debug`.
    pub log_level:        String,
    pub enable_file_logs: bool,
    pub log_dir:          String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

/// Install the global subscriber: compact text on stdout, plus daily JSON
/// files when enabled.  Calling it again is a no-op.
pub fn init_tracing(config: &LogConfig) -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let result = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .max_log_files(KEPT_LOG_FILES)
            .build(&config.log_dir)
            .map_err(|e| format!("log directory {}: {e}", config.log_dir))?;
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(format!("failed to initialize tracing: {e}")),
    }
}
