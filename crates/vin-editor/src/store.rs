//! File store: loading lines from disk and writing documents back.
//!
//! The controller talks to a [`FileStore`] rather than `std::fs` so save
//! behavior (success, failure, byte counts) can be tested without touching
//! the disk. [`DiskStore`] is the real thing.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// The OS error behind the failure.
    #[must_use]
    pub const fn io_error(&self) -> &io::Error {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => source,
        }
    }
}

/// Where documents come from and go to.
pub trait FileStore {
    /// Read `path` as lines split on `\n`, each with trailing `\r`/`\n`
    /// bytes stripped.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] if the file can't be read.
    fn read_lines(&mut self, path: &Path) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Replace the contents of `path` with `bytes`, creating it if needed.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`StoreError::Write`] if the file can't be opened, truncated or
    /// fully written.
    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> Result<usize, StoreError>;
}

/// The local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read_lines(&mut self, path: &Path) -> Result<Vec<Vec<u8>>, StoreError> {
        let data = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(split_lines(&data))
    }

    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> Result<usize, StoreError> {
        let write = || -> io::Result<usize> {
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?;
            // Size first, then contents: a short write leaves the old length.
            file.set_len(bytes.len() as u64)?;
            file.write_all(bytes)?;
            file.flush()?;
            Ok(bytes.len())
        };
        write().map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Split file contents into lines, stripping trailing `\r` and `\n`.
///
/// A final line without a terminator still counts; a terminator at the very
/// end does not start an extra empty line.
#[must_use]
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let end = line
                .iter()
                .rposition(|&b| b != b'\r')
                .map_or(0, |i| i + 1);
            line[..end].to_vec()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(data: &[u8]) -> Vec<String> {
        split_lines(data)
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    // -- split_lines --------------------------------------------------------

    #[test]
    fn split_unix_and_dos_lines() {
        assert_eq!(lines(b"a\nb\n"), ["a", "b"]);
        assert_eq!(lines(b"a\r\nb\r\n"), ["a", "b"]);
        assert_eq!(lines(b"a\nb"), ["a", "b"]);
    }

    #[test]
    fn split_keeps_blank_lines() {
        assert_eq!(lines(b"\n\nx\n\n"), ["", "", "x", ""]);
    }

    #[test]
    fn split_empty_file() {
        assert!(split_lines(b"").is_empty());
        assert_eq!(lines(b"\n"), [""]);
    }

    #[test]
    fn split_keeps_tabs_and_inner_cr() {
        assert_eq!(lines(b"\ta\rb\r\r\n"), ["\ta\rb"]);
    }

    // -- DiskStore ----------------------------------------------------------

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut store = DiskStore;

        assert_eq!(store.write_all(&path, b"one\n\ttwo\n").unwrap(), 9);
        assert_eq!(
            store.read_lines(&path).unwrap(),
            [b"one".to_vec(), b"\ttwo".to_vec()]
        );
    }

    #[test]
    fn write_truncates_longer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "a much longer previous content\n").unwrap();

        DiskStore.write_all(&path, b"short\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short\n");
    }

    #[test]
    fn read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskStore.read_lines(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert_eq!(err.io_error().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/file.txt");
        let err = DiskStore.write_all(&path, b"x").unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
