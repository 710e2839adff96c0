//! Command-line prompts: save-as and search input on the message bar.
//!
//! A [`Prompt`] is plain state owned by the controller and driven by the
//! same dispatch loop as everything else: literal bytes append, erase
//! removes the last byte, commit and cancel are decided by the controller.
//! Nothing here blocks or reads keys.

use crate::cursor::Cursor;
use crate::search::SearchDirection;
use crate::view::Viewport;

/// Cursor and scroll position captured when a search starts, restored when
/// it's cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedView {
    pub cursor: Cursor,
    pub row_offset: usize,
    pub col_offset: usize,
}

impl SavedView {
    #[must_use]
    pub const fn capture(cursor: Cursor, viewport: &Viewport) -> Self {
        Self {
            cursor,
            row_offset: viewport.row_offset,
            col_offset: viewport.col_offset,
        }
    }

    /// Put cursor and offsets back.
    pub const fn restore(&self, cursor: &mut Cursor, viewport: &mut Viewport) {
        *cursor = self.cursor;
        viewport.row_offset = self.row_offset;
        viewport.col_offset = self.col_offset;
    }
}

/// What the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A file name for a document that has none.
    SaveAs,
    /// An incremental search query.
    Search {
        direction: SearchDirection,
        saved: SavedView,
    },
}

/// An active prompt and its input so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: Vec<u8>,
}

impl Prompt {
    #[must_use]
    pub const fn save_as() -> Self {
        Self {
            kind: PromptKind::SaveAs,
            input: Vec::new(),
        }
    }

    #[must_use]
    pub const fn search(direction: SearchDirection, saved: SavedView) -> Self {
        Self {
            kind: PromptKind::Search { direction, saved },
            input: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Append a byte. Only printable ASCII is accepted; returns whether the
    /// input changed.
    pub fn push(&mut self, byte: u8) -> bool {
        if byte.is_ascii_graphic() || byte == b' ' {
            self.input.push(byte);
            true
        } else {
            false
        }
    }

    /// Drop the last byte; returns whether the input changed.
    pub fn erase(&mut self) -> bool {
        self.input.pop().is_some()
    }

    /// The message-bar line: `Save as: name` or `/query` / `?query`.
    #[must_use]
    pub fn line(&self) -> String {
        let input = String::from_utf8_lossy(&self.input);
        match self.kind {
            PromptKind::SaveAs => format!("Save as: {input}"),
            PromptKind::Search { direction, .. } => format!("{}{input}", direction.prompt_char()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> SavedView {
        SavedView {
            cursor: Cursor::new(3, 7),
            row_offset: 5,
            col_offset: 1,
        }
    }

    #[test]
    fn save_as_line() {
        let mut p = Prompt::save_as();
        assert_eq!(p.line(), "Save as: ");
        for b in b"out.txt" {
            p.push(*b);
        }
        assert_eq!(p.line(), "Save as: out.txt");
    }

    #[test]
    fn search_lines_show_direction() {
        let mut fwd = Prompt::search(SearchDirection::Forward, saved());
        let mut bwd = Prompt::search(SearchDirection::Backward, saved());
        fwd.push(b'x');
        bwd.push(b'y');
        assert_eq!(fwd.line(), "/x");
        assert_eq!(bwd.line(), "?y");
    }

    #[test]
    fn push_rejects_control_and_high_bytes() {
        let mut p = Prompt::save_as();
        assert!(!p.push(b'\t'));
        assert!(!p.push(0x1b));
        assert!(!p.push(0xc3));
        assert!(p.push(b' '));
        assert_eq!(p.input(), b" ");
    }

    #[test]
    fn erase_until_empty() {
        let mut p = Prompt::save_as();
        p.push(b'a');
        assert!(p.erase());
        assert!(!p.erase());
        assert!(p.input().is_empty());
    }

    #[test]
    fn saved_view_round_trip() {
        let mut vp = Viewport::new(10, 10);
        vp.row_offset = 5;
        vp.col_offset = 1;
        let s = SavedView::capture(Cursor::new(3, 7), &vp);
        assert_eq!(s, saved());

        let mut cursor = Cursor::ORIGIN;
        let mut moved = Viewport::new(10, 10);
        s.restore(&mut cursor, &mut moved);
        assert_eq!(cursor, Cursor::new(3, 7));
        assert_eq!((moved.row_offset, moved.col_offset), (5, 1));
    }

    #[test]
    fn kind_carries_saved_view() {
        let p = Prompt::search(SearchDirection::Backward, saved());
        match p.kind() {
            PromptKind::Search { direction, saved: s } => {
                assert_eq!(direction, SearchDirection::Backward);
                assert_eq!(s, saved());
            }
            PromptKind::SaveAs => panic!("expected a search prompt"),
        }
    }
}
