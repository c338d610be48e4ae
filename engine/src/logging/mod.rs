pub mod config;
pub mod macros;

pub use config::{init_logging, LogConfig};
pub use tracing::{debug, error, info, trace, warn, Level};

use once_cell::sync::Lazy;
use std::sync::OnceLock;

static LOG_CONFIG: OnceLock<LogConfig> = OnceLock::new();

/// The installed config, or the default (warn-level, no scopes) until
/// `init_logging` runs.
pub fn get_log_config() -> &'static LogConfig {
    static DEFAULT: Lazy<LogConfig> = Lazy::new(LogConfig::default);
    LOG_CONFIG.get().unwrap_or(&DEFAULT)
}

pub(crate) fn set_log_config(config: LogConfig) {
    LOG_CONFIG.set(config).ok();
}
