// SPDX-License-Identifier: MIT
//
// Escape sequence encoders.
//
// Each function writes exactly one terminal command into an `impl Write`
// (normally the frame's OutputBuffer) and decides nothing else. The set is
// what a full-frame redraw needs: hide the cursor, home, erase each line,
// highlight the status bar, place and shape the cursor, show it again.
// Window measurement and teardown use the rest.
//
// Coordinates are 0-based here; the terminal's CUP is 1-based.

use std::io::{self, Write};

bitflags::bitflags! {
    /// SGR text attributes.
    ///
    /// ```
    /// use vin_term::ansi::Attr;
    ///
    /// let banner = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(banner.contains(Attr::UNDERLINE));
    /// assert!(!banner.contains(Attr::INVERSE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD      = 1 << 0;
        const UNDERLINE = 1 << 1;
        /// Reverse video, used for the status bar.
        const INVERSE   = 1 << 2;
    }
}

/// SGR parameter for each attribute, in emission order.
const SGR_CODES: [(Attr, &str); 3] = [
    (Attr::BOLD, "1"),
    (Attr::UNDERLINE, "4"),
    (Attr::INVERSE, "7"),
];

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: move to column `x`, row `y`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// CUF + CUD by 999: both clamp at the screen edge, leaving the cursor in
/// the bottom-right cell.
#[inline]
pub fn cursor_to_far_corner(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// DSR 6. The reply arrives on stdin as `ESC [ row ; col R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Erasing ─────────────────────────────────────────────────────────────────

/// ED 2: blank the whole screen.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// EL 0: blank from the cursor to the end of the line.
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// SGR 0.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

/// One SGR sequence turning on every attribute in `attr`, e.g. `ESC[1;4m`.
/// An empty set writes nothing.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    let params: Vec<&str> = SGR_CODES
        .iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|&(_, code)| code)
        .collect();
    if params.is_empty() {
        return Ok(());
    }
    write!(w, "\x1b[{}m", params.join(";"))
}

// ─── Cursor Shape ────────────────────────────────────────────────────────────

/// DECSCUSR cursor shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// The user's configured shape; restored on exit.
    Default,
    SteadyBlock,
    SteadyBar,
}

impl CursorShape {
    const fn param(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::SteadyBlock => 2,
            Self::SteadyBar => 6,
        }
    }
}

/// `CSI Ps SP q`.
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    write!(w, "\x1b[{} q", shape.param())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
