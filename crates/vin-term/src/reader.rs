// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Bounded byte reads from the terminal.
//
// The editor is single-threaded: one loop renders, reads one key, and
// dispatches it. Reads therefore have to be bounded. `StdinBytes` polls
// stdin's file descriptor with a short timeout and then reads at most one
// byte, so a caller always gets control back within one read window.
// `Ok(None)` means "nothing arrived in time".
//
// That timeout doubles as the escape-sequence window: a lone ESC followed
// by silence is the Escape key, ESC followed promptly by `[` is the start
// of a CSI sequence. The key decoder asks for follow-up bytes through the
// same `ByteSource` and treats `None` as "the sequence ended here".
//
// `VecDeque<u8>` also implements `ByteSource`, which is how tests script
// keystrokes: an exhausted queue behaves like an idle keyboard.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Default read window, matching a raw-mode `VTIME` of one decisecond.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A source of input bytes with a bounded wait.
pub trait ByteSource {
    /// Wait up to one read window for the next byte.
    ///
    /// Returns `Ok(None)` if no byte arrived within the window.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error if the read itself fails. Callers
    /// treat that as fatal.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

// ─── StdinBytes ──────────────────────────────────────────────────────────────

/// Stdin as a [`ByteSource`]: `poll()` with a timeout, then a 1-byte `read()`.
#[derive(Debug, Clone, Copy)]
pub struct StdinBytes {
    timeout: Duration,
}

impl StdinBytes {
    /// Read stdin with the given per-byte wait.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The per-byte wait.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(unix)]
    fn poll_timeout_ms(&self) -> i32 {
        i32::try_from(self.timeout.as_millis()).unwrap_or(i32::MAX)
    }
}

impl Default for StdinBytes {
    fn default() -> Self {
        Self::new(DEFAULT_READ_TIMEOUT)
    }
}

impl ByteSource for StdinBytes {
    #[cfg(unix)]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, self.poll_timeout_ms())
        };

        if ready == 0 {
            return Ok(None);
        }
        if ready < 0 {
            let err = io::Error::last_os_error();
            // A signal (e.g. SIGWINCH) interrupted the wait: treat it as an idle window.
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(None)
            } else {
                Err(err)
            };
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(stdin_fd, (&raw mut byte).cast(), 1) };

        read_outcome(n, byte, io::Error::last_os_error)
    }

    /// Non-unix fallback: a plain blocking read, no timeout.
    #[cfg(not(unix))]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

/// Interpret a one-byte `read()` that followed a ready `poll()`.
///
/// Zero bytes from a readable fd means the terminal hung up; reporting that
/// as idle would have the caller poll a dead fd forever.
#[cfg(unix)]
fn read_outcome(
    n: isize,
    byte: u8,
    last_error: impl FnOnce() -> io::Error,
) -> io::Result<Option<u8>> {
    match n {
        1 => Ok(Some(byte)),
        0 => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "terminal input closed",
        )),
        _ => {
            let err = last_error();
            match err.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
                _ => Err(err),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
