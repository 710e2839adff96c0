//! Line buffer: the document as an ordered list of byte rows.
//!
//! A [`Document`] owns a `Vec<Row>`. Each [`Row`] keeps the raw bytes exactly
//! as typed (tabs included) and a derived `render` copy with tabs expanded to
//! spaces, recomputed after every edit. Cursor arithmetic happens on the raw
//! bytes; drawing happens on the render bytes; [`Row::cx_to_rx`] translates
//! between the two.
//!
//! # Design choices
//!
//! - **One byte is one column.** No UTF-8 decoding, no grapheme widths. A
//!   multi-byte character simply occupies several columns.
//!
//! - **Tabs stay raw.** Saving writes back exactly the bytes the user typed;
//!   only rendering knows about tab stops. Backspace removes one raw byte,
//!   never a heuristic run of spaces.
//!
//! - **Invalid indices are silent no-ops.** Callers clamp coordinates before
//!   use, so an out-of-range index is a caller bug that must not corrupt the
//!   document or crash the editor.
//!
//! - **The dirty counter counts mutations**, not bytes: every successful
//!   mutating call bumps it by exactly one. A successful save resets it.

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the document, without its line terminator.
///
/// The raw bytes never contain `\n`: every way in strips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    fn new(mut chars: Vec<u8>, tab_stop: usize) -> Self {
        chars.retain(|&b| b != b'\n');
        let mut row = Self {
            chars,
            render: Vec::new(),
        };
        row.update(tab_stop);
        row
    }

    /// The raw bytes of the row.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The row as drawn: tabs expanded to spaces.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Number of raw bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Display width of the row after tab expansion.
    #[inline]
    #[must_use]
    pub fn display_width(&self) -> usize {
        self.render.len()
    }

    /// Translate a raw column into a render column.
    ///
    /// Every tab before `cx` advances to the next multiple of `tab_stop`.
    /// Columns past the end are measured as if the row continued with
    /// ordinary bytes.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut rx = 0;
        for &byte in self.chars.iter().take(cx) {
            rx += if byte == b'\t' {
                tab_stop - rx % tab_stop
            } else {
                1
            };
        }
        rx + cx.saturating_sub(self.chars.len())
    }

    /// Raw column of the first byte that is not a space or tab.
    ///
    /// A blank (or empty) row answers 0.
    #[must_use]
    pub fn first_non_blank(&self) -> usize {
        self.chars
            .iter()
            .position(|&b| b != b' ' && b != b'\t')
            .unwrap_or(0)
    }

    fn update(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render.clear();
        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The edited document: rows, a dirty counter and an optional file path.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    dirty: usize,
    path: Option<PathBuf>,
    tab_stop: usize,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty, clean document with no file path.
    #[must_use]
    pub const fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            path: None,
            tab_stop,
        }
    }

    /// A clean document holding `lines`, one row each.
    ///
    /// Lines must not contain terminators; the file store strips them.
    #[must_use]
    pub fn from_lines<I, L>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        Self {
            rows: lines
                .into_iter()
                .map(|line| Row::new(line.into(), tab_stop))
                .collect(),
            dirty: 0,
            path: None,
            tab_stop,
        }
    }

    // -- Metadata -----------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The row at `at`, if any.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows, in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Raw length of row `at`; 0 for the virtual row past the end.
    #[inline]
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Unsaved mutations since the last successful save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    /// Whether there are unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// Reset the dirty counter after a successful save.
    #[inline]
    pub const fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    /// The file this document is bound to.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bind the document to a file path.
    #[inline]
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Tab stop used for rendering.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Render column of raw column `cx` on row `row`.
    #[must_use]
    pub fn cx_to_rx(&self, row: usize, cx: usize) -> usize {
        self.rows
            .get(row)
            .map_or(cx, |r| r.cx_to_rx(cx, self.tab_stop))
    }

    // -- Row operations -----------------------------------------------------

    /// Insert a new row holding `content` at index `at`, shifting later rows.
    /// Any `\n` in `content` is dropped.
    ///
    /// No-op if `at > num_rows()`.
    pub fn insert_row(&mut self, at: usize, content: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(content.to_vec(), self.tab_stop));
        self.dirty += 1;
    }

    /// Remove row `at`, shifting later rows up.
    ///
    /// No-op if `at >= num_rows()`.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Append `bytes` to the end of row `row`, dropping any `\n`.
    ///
    /// No-op if the row doesn't exist.
    pub fn append_row_content(&mut self, row: usize, bytes: &[u8]) {
        let tab_stop = self.tab_stop;
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        r.chars.extend(bytes.iter().filter(|&&b| b != b'\n'));
        r.update(tab_stop);
        self.dirty += 1;
    }

    /// Split row `row` at raw column `at`: the tail moves to a new row below.
    ///
    /// `at` is clamped to the row length. Counts as one mutation.
    pub fn split_row(&mut self, row: usize, at: usize) {
        let tab_stop = self.tab_stop;
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let at = at.min(r.chars.len());
        let tail = r.chars.split_off(at);
        r.update(tab_stop);
        self.rows.insert(row + 1, Row::new(tail, tab_stop));
        self.dirty += 1;
    }

    // -- Character operations -----------------------------------------------

    /// Insert one byte into row `row` at raw column `at` (clamped to the row
    /// length).
    ///
    /// Returns how many display columns the inserted byte occupies at its
    /// position: the distance to the next tab stop for a tab, otherwise 1.
    /// Returns 0 without inserting if the row doesn't exist or `ch` is `\n`;
    /// breaking a line is [`split_row`](Self::split_row)'s job.
    pub fn insert_char(&mut self, row: usize, at: usize, ch: u8) -> usize {
        if ch == b'\n' {
            return 0;
        }
        let tab_stop = self.tab_stop;
        let Some(r) = self.rows.get_mut(row) else {
            return 0;
        };
        let at = at.min(r.chars.len());
        r.chars.insert(at, ch);
        r.update(tab_stop);
        self.dirty += 1;
        r.cx_to_rx(at + 1, tab_stop) - r.cx_to_rx(at, tab_stop)
    }

    /// Remove the byte before raw column `at` in row `row`.
    ///
    /// Returns the number of raw bytes removed: 1, or 0 if `at` is 0, past
    /// the end of the row, or the row doesn't exist.
    pub fn delete_char(&mut self, row: usize, at: usize) -> usize {
        let tab_stop = self.tab_stop;
        let Some(r) = self.rows.get_mut(row) else {
            return 0;
        };
        if at == 0 || at > r.chars.len() {
            return 0;
        }
        r.chars.remove(at - 1);
        r.update(tab_stop);
        self.dirty += 1;
        1
    }

    // -- Serialization ------------------------------------------------------

    /// The on-disk form: every row followed by exactly one `\n`, the last row
    /// included.
    #[must_use]
    pub fn to_serialized_bytes(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_TAB_STOP)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
