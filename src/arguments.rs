//! Centralized command-line argument storage.
//!
//! The logger's per-tag debug filtering reads flags like `--debug-link`
//! before clap ever runs, so raw arguments are captured once into a
//! process-wide store that binaries and tests can override.

use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Override the stored arguments (used by tests).
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Get a copy of the current command-line arguments.
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Check whether a specific flag is present.
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Get the value following a flag, if any.
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag {
            return args.get(i + 1).cloned();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_lookup() {
        set_cmd_args(vec![
            "postsiva".to_string(),
            "--debug-link".to_string(),
            "--config".to_string(),
            "custom.json".to_string(),
        ]);

        assert!(has_arg("--debug-link"));
        assert!(!has_arg("--debug-cache"));
        assert_eq!(get_arg_value("--config"), Some("custom.json".to_string()));
        assert_eq!(get_arg_value("--missing"), None);
    }
}
