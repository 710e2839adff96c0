//! View: scrolling and frame rendering.
//!
//! A [`Viewport`] holds the scroll offsets and the size of the text area. It
//! doesn't own the document or cursor; those are passed in. Scrolling is a
//! pure clamp of the offsets around the cursor, recomputed before every
//! frame.
//!
//! [`render_frame`] writes one complete frame into any `impl Write`
//! (normally an [`OutputBuffer`](vin_term::output::OutputBuffer)), which the
//! caller flushes with a single write:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ text rows / ~ filler         │ ← screen_rows
//! │ ...                          │
//! ├──────────────────────────────┤
//! │ name [+]           row,col % │ ← status bar (inverse)
//! │ message / prompt             │ ← message bar
//! └──────────────────────────────┘
//! ```
//!
//! Nothing is diffed: every frame redraws every row, and each row ends with
//! an erase-to-end-of-line so stale text never survives.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use vin_term::ansi::{self, Attr};

use crate::buffer::Document;
use crate::cursor::Cursor;
use crate::mode::Mode;

/// Rows the status bar and message bar take from the window.
pub const CHROME_ROWS: usize = 2;

const WELCOME_ACCENT_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub row_offset: usize,
    /// First visible render column.
    pub col_offset: usize,
    /// Height of the text area.
    pub screen_rows: usize,
    /// Width of the text area.
    pub screen_cols: usize,
}

impl Viewport {
    /// A viewport at the top-left with the given text area.
    #[must_use]
    pub const fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows,
            screen_cols,
        }
    }

    /// Fit the text area to a terminal window, leaving room for the status
    /// and message bars. Offsets are kept; the next scroll fixes them up.
    pub const fn fit_window(&mut self, window_rows: usize, window_cols: usize) {
        self.screen_rows = window_rows.saturating_sub(CHROME_ROWS);
        self.screen_cols = window_cols;
    }

    /// Pull the offsets just far enough that the cursor's render position is
    /// on screen.
    ///
    /// A zero-sized text area leaves the offsets untouched.
    pub fn scroll(&mut self, doc: &Document, cursor: Cursor) {
        if self.screen_rows == 0 || self.screen_cols == 0 {
            return;
        }

        if cursor.row < self.row_offset {
            self.row_offset = cursor.row;
        }
        if cursor.row >= self.row_offset + self.screen_rows {
            self.row_offset = cursor.row - self.screen_rows + 1;
        }

        let rx = doc.cx_to_rx(cursor.row, cursor.col);
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if rx >= self.col_offset + self.screen_cols {
            self.col_offset = rx - self.screen_cols + 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Status message
// ---------------------------------------------------------------------------

/// A transient message for the message bar.
///
/// Shown while younger than the time-to-live, then suppressed (not
/// deleted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>, now: Instant) -> Self {
        Self {
            text: text.into(),
            set_at: now,
        }
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text if it's still within `ttl` at `now`.
    #[must_use]
    pub fn visible(&self, now: Instant, ttl: Duration) -> Option<&str> {
        (now.saturating_duration_since(self.set_at) < ttl).then_some(self.text.as_str())
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Everything one frame draws.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub doc: &'a Document,
    pub cursor: Cursor,
    pub viewport: &'a Viewport,
    pub mode: Mode,
    /// Message bar contents (already filtered by age, or the prompt line).
    pub message: &'a str,
}

/// Write one complete frame.
///
/// Order: hide cursor, home, text rows, status bar, message bar, place
/// cursor, set cursor shape, show cursor. The viewport must already be
/// scrolled around the cursor.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_frame(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    let vp = frame.viewport;

    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_rows(out, frame.doc, vp)?;
    draw_status_bar(out, frame.doc, frame.cursor, vp.screen_cols)?;
    draw_message_bar(out, frame.message, vp.screen_cols)?;

    let rx = frame.doc.cx_to_rx(frame.cursor.row, frame.cursor.col);
    ansi::cursor_to(
        out,
        saturate_u16(rx.saturating_sub(vp.col_offset)),
        saturate_u16(frame.cursor.row.saturating_sub(vp.row_offset)),
    )?;
    ansi::set_cursor_shape(out, frame.mode.cursor_shape())?;
    ansi::cursor_show(out)
}

fn draw_rows(out: &mut impl Write, doc: &Document, vp: &Viewport) -> io::Result<()> {
    for y in 0..vp.screen_rows {
        match doc.row(y + vp.row_offset) {
            Some(row) => {
                let render = row.render();
                let start = vp.col_offset.min(render.len());
                let end = (vp.col_offset + vp.screen_cols).min(render.len());
                out.write_all(&render[start..end])?;
            }
            None if doc.num_rows() == 0 && y == vp.screen_rows / 3 => {
                draw_welcome(out, vp.screen_cols)?;
            }
            None => out.write_all(b"~")?,
        }
        ansi::erase_line(out)?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

/// `Vinyard editor vX.Y.Z`, centered, with "Vin" bold and underlined.
fn draw_welcome(out: &mut impl Write, cols: usize) -> io::Result<()> {
    let text = format!("Vinyard editor v{}", env!("CARGO_PKG_VERSION"));
    let len = text.len().min(cols);

    let mut padding = (cols - len) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        padding -= 1;
    }
    out.write_all(" ".repeat(padding).as_bytes())?;

    let accent = len.min(WELCOME_ACCENT_LEN);
    ansi::attrs(out, Attr::BOLD | Attr::UNDERLINE)?;
    out.write_all(&text.as_bytes()[..accent])?;
    ansi::reset(out)?;
    out.write_all(&text.as_bytes()[accent..len])
}

fn draw_status_bar(
    out: &mut impl Write,
    doc: &Document,
    cursor: Cursor,
    cols: usize,
) -> io::Result<()> {
    let left = status_left(doc);
    let right = status_right(doc, cursor);

    let left_len = left.len().min(cols);
    ansi::attrs(out, Attr::INVERSE)?;
    out.write_all(&left[..left_len])?;
    if cols - left_len >= right.len() {
        let gap = cols - left_len - right.len();
        out.write_all(" ".repeat(gap).as_bytes())?;
        out.write_all(right.as_bytes())?;
    } else {
        out.write_all(" ".repeat(cols - left_len).as_bytes())?;
    }
    ansi::reset(out)?;
    out.write_all(b"\r\n")
}

/// `name [+]`: the path as given (first 20 bytes), or `[No Name]`.
fn status_left(doc: &Document) -> Vec<u8> {
    let mut left: Vec<u8> = match doc.path() {
        Some(path) => {
            let name = path.as_os_str().as_encoded_bytes();
            name[..name.len().min(20)].to_vec()
        }
        None => b"[No Name]".to_vec(),
    };
    left.push(b' ');
    if doc.is_dirty() {
        left.extend_from_slice(b"[+]");
    }
    left
}

/// `row,col pct%` with 1-based row and column.
fn status_right(doc: &Document, cursor: Cursor) -> String {
    format!(
        "{},{} {:>10}%",
        cursor.row + 1,
        cursor.col + 1,
        percent_through(cursor.row, doc.num_rows())
    )
}

/// How far `row` is through a document of `num_rows` rows, rounded and
/// clamped to 100. An empty document is 100% through.
fn percent_through(row: usize, num_rows: usize) -> usize {
    if num_rows == 0 {
        return 100;
    }
    ((100 * (row + 1) + num_rows / 2) / num_rows).min(100)
}

fn draw_message_bar(out: &mut impl Write, message: &str, cols: usize) -> io::Result<()> {
    ansi::erase_line(out)?;
    let bytes = message.as_bytes();
    out.write_all(&bytes[..bytes.len().min(cols)])
}

fn saturate_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
