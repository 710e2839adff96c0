// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and
// raw fd writes are only reachable through libc. Each unsafe block is
// minimal.
#![allow(unsafe_code)]
//
// Raw mode here is the classic recipe: no echo, no canonical line
// buffering, no signal keys (Ctrl-C and Ctrl-Z arrive as bytes), no flow
// control, no CR-to-NL translation on input and no output post-processing.
// Because OPOST is off, everything the editor draws must end lines with
// an explicit "\r\n".
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built
// restore sequence straight to fd 1, then puts the saved termios back.
// A panic mid-frame therefore still leaves the shell usable and the
// panic message readable.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use thiserror::Error;

use crate::ansi;
use crate::reader::ByteSource;

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Failures talking to the terminal. All of them are fatal to the editor.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("stdin is not a terminal")]
    NotATerminal,

    #[error("failed to read terminal attributes")]
    GetAttributes {
        #[source]
        source: io::Error,
    },

    #[error("failed to set terminal attributes")]
    SetAttributes {
        #[source]
        source: io::Error,
    },

    #[error("failed to determine the terminal window size")]
    WindowSize,

    #[error("failed to write to the terminal")]
    Write {
        #[source]
        source: io::Error,
    },

    #[error("failed to read from the terminal")]
    Read {
        #[source]
        source: io::Error,
    },
}

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// kernel reports a zero width.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Measure the window by asking the terminal where the cursor ends up.
///
/// Pushes the cursor to the bottom-right corner, requests a cursor position
/// report and parses the `ESC [ rows ; cols R` reply from `input`. Used when
/// `TIOCGWINSZ` is unavailable.
///
/// # Errors
///
/// [`TerminalError::Write`] if the request can't be sent,
/// [`TerminalError::Read`] if reading the reply fails, and
/// [`TerminalError::WindowSize`] if the reply is missing or malformed.
pub fn query_size_via_cursor(
    out: &mut impl Write,
    input: &mut impl ByteSource,
) -> Result<Size, TerminalError> {
    ansi::cursor_to_far_corner(out)
        .and_then(|()| ansi::request_cursor_position(out))
        .and_then(|()| out.flush())
        .map_err(|source| TerminalError::Write { source })?;

    let mut reply = Vec::with_capacity(32);
    while reply.len() < 32 {
        match input
            .read_byte()
            .map_err(|source| TerminalError::Read { source })?
        {
            Some(b'R') => break,
            Some(byte) => reply.push(byte),
            None => return Err(TerminalError::WindowSize),
        }
    }

    parse_cursor_report(&reply).ok_or(TerminalError::WindowSize)
}

/// Parse the body of a cursor position report: `ESC [ rows ; cols`
/// (the terminating `R` already stripped).
fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let size = Size {
        cols: cols.parse().ok()?,
        rows: rows.parse().ok()?,
    };
    (size.cols > 0).then_some(size)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// reach it.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Terminal restore sequence for emergency use: reset SGR attributes, reset
/// cursor shape, show cursor, clear the screen, home the cursor.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[2J\
    \x1b[H";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] directly to stdout's file descriptor.
///
/// Bypasses `io::stdout()` so a panic raised while the lock is held (e.g.
/// mid-frame flush) can't deadlock.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// [`enter`](Self::enter) saves the current mode and switches to raw mode.
/// Dropping the handle (or calling [`leave`](Self::leave)) clears the
/// screen and restores the saved mode, on every exit path including panics.
///
/// ```no_run
/// use vin_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... render frames, handle input ...
/// # Ok::<(), vin_term::terminal::TerminalError>(())
/// ```
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    active: bool,
}

impl Terminal {
    /// Create a handle. Does **not** touch the terminal until
    /// [`enter`](Self::enter).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            active: false,
        }
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Raw mode is skipped when stdin is not a TTY so tests can drive the
    /// handle; the binary checks [`is_tty`] itself before getting here.
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// [`TerminalError::GetAttributes`] / [`TerminalError::SetAttributes`]
    /// if the terminal mode can't be read or changed.
    pub fn enter(&mut self) -> Result<(), TerminalError> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        tracing::debug!("entered raw mode");
        self.active = true;
        Ok(())
    }

    /// Clear the screen, show the cursor and restore the saved terminal mode.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Write`] if the clear can't be written,
    /// [`TerminalError::SetAttributes`] if the mode can't be restored.
    pub fn leave(&mut self) -> Result<(), TerminalError> {
        if !self.active {
            return Ok(());
        }

        let written = {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_restore(&mut lock)
        };
        // Restore the mode even when the screen couldn't be cleared.
        let restored = self.disable_raw_mode();
        self.active = false;

        written.map_err(|source| TerminalError::Write { source })?;
        restored?;

        tracing::debug!("left raw mode");
        Ok(())
    }

    /// Current window size, falling back to a cursor position report when
    /// `TIOCGWINSZ` fails.
    ///
    /// # Errors
    ///
    /// [`TerminalError::WindowSize`] if neither method yields a size.
    pub fn window_size(&self, input: &mut impl ByteSource) -> Result<Size, TerminalError> {
        if let Some(size) = get_size() {
            return Ok(size);
        }
        tracing::debug!("TIOCGWINSZ unavailable, asking the terminal for a cursor report");
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        query_size_via_cursor(&mut lock, input)
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> Result<(), TerminalError> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(TerminalError::GetAttributes {
                    source: io::Error::last_os_error(),
                });
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most a decisecond.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(TerminalError::SetAttributes {
                    source: io::Error::last_os_error(),
                });
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> Result<(), TerminalError> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> Result<(), TerminalError> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(TerminalError::SetAttributes {
                        source: io::Error::last_os_error(),
                    });
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> Result<(), TerminalError> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

/// The orderly counterpart of [`EMERGENCY_RESTORE`].
fn write_restore(w: &mut impl Write) -> io::Result<()> {
    ansi::reset(w)?;
    ansi::set_cursor_shape(w, ansi::CursorShape::Default)?;
    ansi::cursor_show(w)?;
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)?;
    w.flush()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
