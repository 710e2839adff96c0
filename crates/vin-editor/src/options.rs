//! Editor options and the TOML config file.
//!
//! Every tunable has a default matching the classic behavior, so a missing
//! config file is not an error. A present file is parsed strictly: unknown
//! keys are rejected and values are validated before the editor starts.
//!
//! | Key                 | Type   | Default | Meaning                            |
//! |---------------------|--------|---------|------------------------------------|
//! | `tab_stop`          | int    | 2       | Render width of a tab stop         |
//! | `quit_times`        | int    | 2       | Quits needed to leave a dirty doc  |
//! | `message_ttl_secs`  | int    | 5       | How long status messages stay      |
//! | `leader`            | char   | `" "`   | Prefix of leader commands          |
//! | `escape_timeout_ms` | int    | 100     | Read window for escape sequences   |
//!
//! ```toml
//! tab_stop = 4
//! leader = ","
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TAB_STOP: usize = 2;
pub const DEFAULT_QUIT_TIMES: usize = 2;
pub const DEFAULT_MESSAGE_TTL_SECS: u64 = 5;
pub const DEFAULT_LEADER: char = ' ';
pub const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid `{key}` in config: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Editor tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub tab_stop: usize,
    pub quit_times: usize,
    pub message_ttl_secs: u64,
    pub leader: char,
    pub escape_timeout_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            message_ttl_secs: DEFAULT_MESSAGE_TTL_SECS,
            leader: DEFAULT_LEADER,
            escape_timeout_ms: DEFAULT_ESCAPE_TIMEOUT_MS,
        }
    }
}

impl Options {
    /// Read and validate the config file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file can't be read (including when it
    /// doesn't exist), [`ConfigError::Parse`] for malformed TOML or unknown
    /// keys, [`ConfigError::Invalid`] for out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the not-found case.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate TOML text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_stop == 0 {
            return Err(ConfigError::Invalid {
                key: "tab_stop",
                reason: "must be at least 1",
            });
        }
        if self.quit_times == 0 {
            return Err(ConfigError::Invalid {
                key: "quit_times",
                reason: "must be at least 1",
            });
        }
        if !self.leader.is_ascii() || self.leader.is_ascii_control() {
            return Err(ConfigError::Invalid {
                key: "leader",
                reason: "must be a printable ASCII character",
            });
        }
        if self.escape_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "escape_timeout_ms",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// The leader as a raw byte. Validated options always have an ASCII
    /// leader; anything else falls back to space.
    #[must_use]
    pub fn leader_byte(&self) -> u8 {
        u8::try_from(self.leader)
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or(b' ')
    }

    #[must_use]
    pub const fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    #[must_use]
    pub const fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Options, ConfigError> {
        Options::parse(text, Path::new("config.toml"))
    }

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.tab_stop, 2);
        assert_eq!(o.quit_times, 2);
        assert_eq!(o.message_ttl(), Duration::from_secs(5));
        assert_eq!(o.leader_byte(), b' ');
        assert_eq!(o.escape_timeout(), Duration::from_millis(100));
        o.validate().unwrap();
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(parse("").unwrap(), Options::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let o = parse("tab_stop = 4\nleader = \",\"\n").unwrap();
        assert_eq!(o.tab_stop, 4);
        assert_eq!(o.leader_byte(), b',');
        assert_eq!(o.quit_times, DEFAULT_QUIT_TIMES);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(parse("tabstop = 4"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(matches!(parse("tab_stop = \"wide\""), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn zero_values_are_invalid() {
        for (text, key) in [
            ("tab_stop = 0", "tab_stop"),
            ("quit_times = 0", "quit_times"),
            ("escape_timeout_ms = 0", "escape_timeout_ms"),
        ] {
            match parse(text) {
                Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
                other => panic!("{text}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_ascii_or_control_leader_is_invalid() {
        assert!(matches!(parse("leader = \"é\""), Err(ConfigError::Invalid { key: "leader", .. })));
        assert!(matches!(parse("leader = \"\\t\""), Err(ConfigError::Invalid { key: "leader", .. })));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Options::load(&path), Err(ConfigError::Read { .. })));
        assert_eq!(Options::load_or_default(&path).unwrap(), Options::default());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quit_times = 3\nmessage_ttl_secs = 1\n").unwrap();
        let o = Options::load_or_default(&path).unwrap();
        assert_eq!(o.quit_times, 3);
        assert_eq!(o.message_ttl(), Duration::from_secs(1));
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse("= nope").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse config file config.toml");
    }
}
