// SPDX-License-Identifier: MIT
//
// Frame output.
//
// Rendering writes into an OutputBuffer, never into stdout directly. Once a
// frame is complete, present() hands all of it to the terminal with one
// write_all and empties the buffer, so the terminal never shows half a
// frame. The allocation is kept between frames.

use std::io::{self, Write};

use crate::terminal::TerminalError;

/// Initial capacity: a full 200x60 screen of text plus escapes fits.
const FRAME_CAPACITY: usize = 16 * 1024;

/// Growable byte accumulator for one frame.
#[derive(Debug)]
pub struct OutputBuffer {
    frame: Vec<u8>,
    presented: u64,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: Vec::with_capacity(FRAME_CAPACITY),
            presented: 0,
        }
    }

    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        &self.frame
    }

    #[cfg(test)]
    const fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Write the pending frame to stdout. See [`present_to`](Self::present_to).
    ///
    /// # Errors
    ///
    /// [`TerminalError::Write`] if stdout rejects the frame.
    pub fn present(&mut self) -> Result<usize, TerminalError> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.present_to(&mut lock)
    }

    /// Write the pending frame to `w` in one `write_all`, flush, and start a
    /// new frame. Returns the number of bytes written; an empty frame writes
    /// nothing.
    ///
    /// On failure the frame stays pending.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Write`] wrapping the writer's error.
    pub fn present_to(&mut self, w: &mut impl Write) -> Result<usize, TerminalError> {
        if self.frame.is_empty() {
            return Ok(0);
        }
        w.write_all(&self.frame)
            .and_then(|()| w.flush())
            .map_err(|source| TerminalError::Write { source })?;

        let len = self.frame.len();
        self.frame.clear();
        self.presented += 1;
        tracing::trace!(bytes = len, frame = self.presented, "frame presented");
        Ok(len)
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.frame.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// Does nothing; a frame leaves only through `present`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
