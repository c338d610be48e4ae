use std::collections::HashMap;
use tracing::Level;

/// Per-scope log filtering on top of `tracing`.
///
/// A scope is a coarse subsystem name ("transition", "mission", ...) rather
/// than a module path, so the same env var works across crates in the
/// workspace.
#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<String, Level>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    /// Build a config from an environment variable such as `PASSAGE_LOG`.
    ///
    /// Format: `info,transition=trace,mission=debug` — a bare level sets the
    /// global floor, `scope=level` entries override per scope. Unparseable
    /// parts are ignored.
    pub fn from_env(env_var_name: &str) -> Self {
        let mut config = Self::new();

        if let Ok(spec) = std::env::var(env_var_name) {
            config.parse_config_string(&spec);
        }

        config
    }

    fn parse_config_string(&mut self, spec: &str) {
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('=') {
                Some((scope, level)) => {
                    if let Some(level) = parse_level(level.trim()) {
                        self.scope_levels.insert(scope.trim().to_string(), level);
                    }
                }
                None => {
                    if let Some(level) = parse_level(part) {
                        self.global_level = level;
                    }
                }
            }
        }
    }

    pub fn should_log(&self, scope: &str, level: Level) -> bool {
        let target_level = self.scope_levels.get(scope).unwrap_or(&self.global_level);
        level <= *target_level
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: String, level: Level) {
        self.scope_levels.insert(scope, level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Initialize the tracing subscriber and install the scoped config read from
/// the given environment variable (e.g. `init_logging("PASSAGE_LOG")`).
pub fn init_logging(env_var_name: &str) -> LogConfig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = LogConfig::from_env(env_var_name);
    super::set_log_config(config.clone());
    config
}
