// SPDX-License-Identifier: MIT
//
// Per-user locations for the config file and the log directory, following
// the XDG base directory layout:
//
//   config  $XDG_CONFIG_HOME/vin/config.toml   (~/.config/vin/config.toml)
//   logs    $XDG_STATE_HOME/vin/logs           (~/.local/state/vin/logs)
//
// Lookups take the environment as a function so tests don't have to mutate
// the real process environment.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "vin";
const CONFIG_FILE: &str = "config.toml";

/// Where the config file lives, if a home can be determined at all.
pub fn user_config_file() -> Option<PathBuf> {
    config_file_from(|key| env::var_os(key))
}

/// Where log files go. Falls back to the temp dir without a home.
pub fn user_log_dir() -> PathBuf {
    log_dir_from(|key| env::var_os(key))
}

fn config_file_from(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let base = non_empty(var("XDG_CONFIG_HOME"))
        .map(PathBuf::from)
        .or_else(|| non_empty(var("HOME")).map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(APP_DIR).join(CONFIG_FILE))
}

fn log_dir_from(var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    if let Some(state_home) = non_empty(var("XDG_STATE_HOME")) {
        return PathBuf::from(state_home).join(APP_DIR).join("logs");
    }
    non_empty(var("HOME"))
        .map_or_else(env::temp_dir, PathBuf::from)
        .join(".local")
        .join("state")
        .join(APP_DIR)
        .join("logs")
}

/// XDG says an empty variable counts as unset.
fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<OsString> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| OsString::from(*v))
        }
    }

    #[test]
    fn config_prefers_xdg() {
        let var = env_of(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/u")]);
        assert_eq!(
            config_file_from(var),
            Some(PathBuf::from("/xdg/vin/config.toml"))
        );
    }

    #[test]
    fn config_falls_back_to_home() {
        let var = env_of(&[("XDG_CONFIG_HOME", ""), ("HOME", "/home/u")]);
        assert_eq!(
            config_file_from(var),
            Some(PathBuf::from("/home/u/.config/vin/config.toml"))
        );
    }

    #[test]
    fn config_without_any_home() {
        assert_eq!(config_file_from(env_of(&[])), None);
    }

    #[test]
    fn log_dir_prefers_xdg_state() {
        let var = env_of(&[("XDG_STATE_HOME", "/state"), ("HOME", "/home/u")]);
        assert_eq!(log_dir_from(var), PathBuf::from("/state/vin/logs"));
    }

    #[test]
    fn log_dir_falls_back_to_home() {
        let var = env_of(&[("HOME", "/home/u")]);
        assert_eq!(
            log_dir_from(var),
            PathBuf::from("/home/u/.local/state/vin/logs")
        );
    }

    #[test]
    fn log_dir_without_home_uses_temp() {
        assert!(log_dir_from(env_of(&[])).starts_with(env::temp_dir()));
    }
}
