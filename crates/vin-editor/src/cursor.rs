//! Cursor: a clamped `(col, row)` position in buffer coordinates.
//!
//! The cursor may sit on the virtual row one past the last row (that's where
//! typing into an empty document starts) and one past the last byte of a row
//! (append position). Every movement ends with [`Cursor::clamp`], so the
//! invariant `row <= num_rows && col <= row_len(row)` holds after any motion.
//!
//! The cursor doesn't own or reference the document; the document is passed
//! to each movement method.

use crate::buffer::Document;

/// A position in the document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Raw byte column.
    pub col: usize,
    /// Row index; `num_rows` is the virtual row past the end.
    pub row: usize,
}

impl Cursor {
    /// The origin.
    pub const ORIGIN: Self = Self { col: 0, row: 0 };

    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Pull the cursor back inside the document.
    pub fn clamp(&mut self, doc: &Document) {
        self.row = self.row.min(doc.num_rows());
        self.col = self.col.min(doc.row_len(self.row));
    }

    // -- Single steps -------------------------------------------------------

    pub fn move_left(&mut self, doc: &Document) {
        self.col = self.col.saturating_sub(1);
        self.clamp(doc);
    }

    pub fn move_right(&mut self, doc: &Document) {
        if self.col < doc.row_len(self.row) {
            self.col += 1;
        }
        self.clamp(doc);
    }

    pub fn move_up(&mut self, doc: &Document) {
        self.row = self.row.saturating_sub(1);
        self.clamp(doc);
    }

    pub fn move_down(&mut self, doc: &Document) {
        if self.row < doc.num_rows() {
            self.row += 1;
        }
        self.clamp(doc);
    }

    // -- Line positions -----------------------------------------------------

    /// Column 0.
    pub const fn line_start(&mut self) {
        self.col = 0;
    }

    /// One past the last byte of the row.
    pub fn line_end(&mut self, doc: &Document) {
        self.col = doc.row_len(self.row);
    }

    /// First byte that isn't a space or tab (0 on the virtual row).
    pub fn first_non_blank(&mut self, doc: &Document) {
        self.col = doc.row(self.row).map_or(0, |r| r.first_non_blank());
    }

    // -- Multi-row motions --------------------------------------------------

    /// Move `n` rows up, stopping at the first row.
    pub fn move_up_by(&mut self, doc: &Document, n: usize) {
        self.row = self.row.saturating_sub(n);
        self.clamp(doc);
    }

    /// Move `n` rows down, stopping at the virtual row past the end.
    pub fn move_down_by(&mut self, doc: &Document, n: usize) {
        self.row = self.row.saturating_add(n);
        self.clamp(doc);
    }

    /// Page up: jump to the top of the screen, then a full screen further.
    pub fn page_up(&mut self, doc: &Document, row_offset: usize, screen_rows: usize) {
        self.row = row_offset;
        self.move_up_by(doc, screen_rows);
    }

    /// Page down: jump to the bottom of the screen, then a full screen further.
    pub fn page_down(&mut self, doc: &Document, row_offset: usize, screen_rows: usize) {
        self.row = (row_offset + screen_rows.saturating_sub(1)).min(doc.num_rows());
        self.move_down_by(doc, screen_rows);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
