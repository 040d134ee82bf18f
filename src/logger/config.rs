/// Logger configuration with per-tag debug control
///
/// Populated once at startup from raw command-line arguments:
/// - `--quiet` raises the threshold to warnings only
/// - `--verbose` shows everything including verbose traces
/// - `--debug-<tag>` enables debug output for one subsystem
/// - `--debug-all` enables debug output everywhere

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets printed (errors always pass)
    pub min_level: LogLevel,
    /// Tags with debug output enabled via --debug-<tag>
    pub debug_tags: HashSet<String>,
    /// --debug-all shortcut
    pub debug_all: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            debug_all: false,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the configuration from the stored command-line arguments.
pub fn init_from_args() {
    let args = arguments::get_cmd_args();

    let mut config = LoggerConfig::default();

    if args.iter().any(|a| a == "--quiet") {
        config.min_level = LogLevel::Warning;
    }
    if args.iter().any(|a| a == "--verbose") {
        config.min_level = LogLevel::Verbose;
    }
    config.debug_all = args.iter().any(|a| a == "--debug-all");

    for arg in &args {
        if let Some(tag) = arg.strip_prefix("--debug-") {
            if tag != "all" {
                config.debug_tags.insert(tag.to_string());
            }
        }
    }

    set_logger_config(config);
}

pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(_) => LoggerConfig::default(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Whether debug output is enabled for a tag.
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_all || config.debug_tags.contains(&tag.to_debug_key())
}
