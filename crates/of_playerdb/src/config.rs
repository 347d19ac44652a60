//! Store location and sizing.
//!
//! Resolution order for each path:
//! 1) the canonical env var (`OF_PLAYER_DB_PATH` / `OF_STRING_DB_PATH`) if set and non-empty
//! 2) the default relative path (`players.db` / `strings.db`)

use crate::format::MAX_PLAYERS;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Env var overriding the player store path.
pub const PLAYER_DB_ENV: &str = "OF_PLAYER_DB_PATH";

/// Env var overriding the string table path.
pub const STRING_DB_ENV: &str = "OF_STRING_DB_PATH";

pub const DEFAULT_PLAYER_DB_REL_PATH: &str = "players.db";
pub const DEFAULT_STRING_DB_REL_PATH: &str = "strings.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub strings_path: PathBuf,
    /// Slot count used when creating a new store file.
    pub capacity: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PLAYER_DB_REL_PATH),
            strings_path: PathBuf::from(DEFAULT_STRING_DB_REL_PATH),
            capacity: MAX_PLAYERS,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_strings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.strings_path = path.into();
        self
    }

    /// Defaults overridden by `OF_PLAYER_DB_PATH` / `OF_STRING_DB_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            path: resolve(PLAYER_DB_ENV, DEFAULT_PLAYER_DB_REL_PATH),
            strings_path: resolve(STRING_DB_ENV, DEFAULT_STRING_DB_REL_PATH),
            capacity: MAX_PLAYERS,
        }
    }
}
