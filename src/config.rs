//! Runtime configuration from the environment.
//!
//! | variable                          | default               |
//! |-----------------------------------|-----------------------|
//! | `COMPONENTS_HISTORY_LIMIT`        | `50`                  |
//! | `COMPONENTS_HISTORY_COMPRESSION`  | `false`               |
//! | `COMPONENTS_STORAGE_DIR`          | `.components-builder` |
//!
//! The binary loads `.env` first, so these can live there too.

use std::path::PathBuf;

use tracing::warn;

use crate::history::{HistoryOptions, DEFAULT_MAX_HISTORY_SIZE};
use crate::store::StoreOptions;

pub const HISTORY_LIMIT_VAR: &str = "COMPONENTS_HISTORY_LIMIT";
pub const HISTORY_COMPRESSION_VAR: &str = "COMPONENTS_HISTORY_COMPRESSION";
pub const STORAGE_DIR_VAR: &str = "COMPONENTS_STORAGE_DIR";
pub const DEFAULT_STORAGE_DIR: &str = ".components-builder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Undo depth; `0` disables undo.
    pub history_limit: usize,
    pub history_compression: bool,
    pub storage_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_MAX_HISTORY_SIZE,
            history_compression: false,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their defaults; unparsable
    /// ones warn and keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(HISTORY_LIMIT_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.history_limit = limit,
                Err(e) => warn!(var = HISTORY_LIMIT_VAR, value = %raw, error = %e, "ignoring invalid history limit"),
            }
        }

        if let Some(raw) = lookup(HISTORY_COMPRESSION_VAR) {
            match parse_flag(&raw) {
                Some(flag) => config.history_compression = flag,
                None => warn!(var = HISTORY_COMPRESSION_VAR, value = %raw, "ignoring invalid flag"),
            }
        }

        match lookup(STORAGE_DIR_VAR) {
            Some(dir) if !dir.trim().is_empty() => config.storage_dir = PathBuf::from(dir),
            Some(_) => warn!(var = STORAGE_DIR_VAR, "ignoring empty storage dir"),
            None => {}
        }

        config
    }

    pub fn history_options(&self) -> HistoryOptions {
        HistoryOptions {
            max_history_size: self.history_limit,
            enable_compression: self.history_compression,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            history: self.history_options(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
        assert_eq!(Config::default().history_limit, 50);
    }

    #[test]
    fn reads_all_vars() {
        let config = Config::from_lookup(lookup(&[
            (HISTORY_LIMIT_VAR, "10"),
            (HISTORY_COMPRESSION_VAR, "1"),
            (STORAGE_DIR_VAR, "/tmp/docs"),
        ]));
        assert_eq!(config.history_limit, 10);
        assert!(config.history_compression);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/docs"));

        let options = config.store_options();
        assert_eq!(options.history.max_history_size, 10);
        assert!(options.history.enable_compression);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            (HISTORY_LIMIT_VAR, "lots"),
            (HISTORY_COMPRESSION_VAR, "maybe"),
            (STORAGE_DIR_VAR, "  "),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }
}
