// SPDX-License-Identifier: MIT
//
// File logging. The terminal belongs to the frame writer while the editor
// runs, so every log line goes to a file: `--log-file` if given, otherwise
// vin.log in the per-user state directory. `VIN_LOG` takes an EnvFilter
// directive (default `info`).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

use crate::dirs;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "VIN_LOG";

const DEFAULT_LOG_FILE: &str = "vin.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log file path {} has no file name", path.display())]
    InvalidPath { path: PathBuf },

    #[error("create log directory {} failed", path.display())]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("initialize tracing subscriber failed")]
    InitSubscriber {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Install the global subscriber.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), LoggingError> {
    let (dir, file_name) = match log_file {
        Some(path) => split_log_path(path)?,
        None => (dirs::user_log_dir(), PathBuf::from(DEFAULT_LOG_FILE)),
    };
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateLogDir {
        path: dir.clone(),
        source,
    })?;

    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));
    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    tracing_subscriber::fmt()
        .with_timer(timer)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|source| LoggingError::InitSubscriber { source })?;

    Ok(())
}

/// Split an explicit log path into its directory and file name. A bare file
/// name lives in the current directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError> {
    let file_name = path.file_name().ok_or_else(|| LoggingError::InvalidPath {
        path: path.to_path_buf(),
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_nested_path() {
        let (dir, name) = split_log_path(Path::new("/tmp/vin/debug.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/vin"));
        assert_eq!(name, PathBuf::from("debug.log"));
    }

    #[test]
    fn split_bare_file_name() {
        let (dir, name) = split_log_path(Path::new("vin.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("vin.log"));
    }

    #[test]
    fn split_rejects_directory_like_path() {
        assert!(matches!(
            split_log_path(Path::new("/")),
            Err(LoggingError::InvalidPath { .. })
        ));
        assert!(matches!(
            split_log_path(Path::new("logs/..")),
            Err(LoggingError::InvalidPath { .. })
        ));
    }
}
