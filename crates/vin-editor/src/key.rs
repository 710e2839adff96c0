//! Modal key decoding: raw bytes in, semantic [`Action`]s out.
//!
//! [`KeyDecoder::next_action`] reads one key's worth of bytes from a
//! [`ByteSource`] and classifies it for the given [`Mode`]. It never touches
//! the document, cursor or viewport; the controller decides what an action
//! means.
//!
//! # Multi-byte keys
//!
//! - **Escape sequences.** ESC followed promptly by `[` or `O` starts a CSI
//!   or SS3 sequence (arrows, Home/End, PageUp/PageDown). ESC followed by
//!   silence is the Escape key itself: it leaves Insert mode
//!   ([`Action::ModeBreak`]) and cancels a prompt ([`Action::CancelLine`]).
//!   ESC followed by any other byte is the Escape key too, and that byte is
//!   held back and decoded as the next key.
//!
//! - **Leader commands.** In Normal mode the leader byte (space by default)
//!   reads one more byte and looks it up in a fixed table: `q` quit, `w`
//!   write, `c` clear the search matches. Anything else, or no byte at all,
//!   is [`Action::LeaderNoop`].
//!
//! # Byte tables
//!
//! | Byte            | Normal            | Insert           | CommandLine |
//! |-----------------|-------------------|------------------|-------------|
//! | `h` `j` `k` `l` | motions           | literal          | literal     |
//! | `0` `^` `$`     | line positions    | literal          | literal     |
//! | `/` `?`         | enter search      | literal          | literal     |
//! | `n` `N`         | next/prev match   | literal          | literal     |
//! | `i`             | enter Insert      | literal          | literal     |
//! | Ctrl-U/D/B/F    | half page/page    | ignored          | ignored     |
//! | Enter           | next line start   | split line       | commit      |
//! | Backspace       | left              | delete back      | erase       |
//! | Tab             | ignored           | literal          | ignored     |
//! | Ctrl-L          | redraw            | redraw           | ignored     |

use std::io;

use vin_term::reader::ByteSource;

use crate::mode::Mode;

const ESC: u8 = 0x1b;
const BACKSPACE: u8 = 0x7f;
const ENTER: u8 = b'\r';
const TAB: u8 = b'\t';

/// Longest CSI body we bother to collect before giving up on a sequence.
const MAX_CSI_LEN: usize = 16;

const fn ctrl(key: u8) -> u8 {
    key & 0x1f
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a keypress means, given the mode it was typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // -- Leader commands --
    /// Leader + `q`.
    Quit,
    /// Leader + `w`.
    Save,
    /// Leader + `c`: discard the search match cache.
    ClearSearch,
    /// Leader followed by an unknown byte, or by nothing.
    LeaderNoop,

    // -- Motions --
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// `0`: column 0.
    LineStart,
    /// `^`: first non-blank column.
    FirstNonBlank,
    /// `$`: one past the last byte.
    LineEnd,
    /// Enter in Normal mode: down one row, then first non-blank.
    NextLineStart,
    HalfPageUp,
    HalfPageDown,
    PageUp,
    PageDown,

    // -- Mode changes --
    /// `i`.
    EnterInsert,
    /// `/` (forward) or `?` (backward).
    EnterSearch { forward: bool },
    /// Lone ESC in Insert mode: back to Normal.
    ModeBreak,

    // -- Search navigation --
    /// `n`.
    SearchNext,
    /// `N`.
    SearchPrev,

    // -- Editing --
    /// Enter in Insert mode.
    InsertNewline,
    /// Backspace in Insert mode.
    DeleteBack,
    /// A byte to insert (Insert) or append to the prompt (CommandLine).
    Literal(u8),

    // -- Prompt --
    /// Enter in CommandLine mode.
    CommitLine,
    /// ESC in CommandLine mode.
    CancelLine,
    /// Backspace in CommandLine mode.
    Erase,

    /// Ctrl-L: redraw, nothing else.
    Redraw,
    /// A key with no meaning in the current mode.
    Noop,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Byte-to-action state machine.
///
/// The only state is one held-back byte: the byte that followed a lone ESC
/// and turned out not to start an escape sequence.
#[derive(Debug, Clone)]
pub struct KeyDecoder {
    leader: u8,
    pending: Option<u8>,
}

impl KeyDecoder {
    /// A decoder with the given leader byte.
    #[must_use]
    pub const fn new(leader: u8) -> Self {
        Self {
            leader,
            pending: None,
        }
    }

    /// The leader byte.
    #[inline]
    #[must_use]
    pub const fn leader(&self) -> u8 {
        self.leader
    }

    /// Decode the next key.
    ///
    /// Returns `Ok(None)` when no byte arrives within one read window; the
    /// caller simply asks again.
    ///
    /// # Errors
    ///
    /// Propagates read failures from `src`.
    pub fn next_action(
        &mut self,
        mode: Mode,
        src: &mut impl ByteSource,
    ) -> io::Result<Option<Action>> {
        let Some(byte) = self.next_byte(src)? else {
            return Ok(None);
        };

        let action = if byte == ESC {
            self.decode_escape(mode, src)?
        } else if mode == Mode::Normal && byte == self.leader {
            self.decode_leader(src)?
        } else {
            match mode {
                Mode::Normal => normal(byte),
                Mode::Insert => insert(byte),
                Mode::CommandLine => command_line(byte),
            }
        };
        Ok(Some(action))
    }

    fn next_byte(&mut self, src: &mut impl ByteSource) -> io::Result<Option<u8>> {
        match self.pending.take() {
            Some(byte) => Ok(Some(byte)),
            None => src.read_byte(),
        }
    }

    fn decode_leader(&mut self, src: &mut impl ByteSource) -> io::Result<Action> {
        Ok(match self.next_byte(src)? {
            Some(b'q') => Action::Quit,
            Some(b'w') => Action::Save,
            Some(b'c') => Action::ClearSearch,
            _ => Action::LeaderNoop,
        })
    }

    fn decode_escape(&mut self, mode: Mode, src: &mut impl ByteSource) -> io::Result<Action> {
        let key = match src.read_byte()? {
            None => return Ok(lone_escape(mode)),
            Some(b'[') => decode_csi(src)?,
            Some(b'O') => src.read_byte()?.and_then(ss3_key),
            Some(other) => {
                self.pending = Some(other);
                return Ok(lone_escape(mode));
            }
        };

        Ok(match (mode, key) {
            (Mode::CommandLine, _) | (_, None) => Action::Noop,
            (_, Some(action)) => action,
        })
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new(b' ')
    }
}

// ---------------------------------------------------------------------------
// Escape sequences
// ---------------------------------------------------------------------------

const fn lone_escape(mode: Mode) -> Action {
    match mode {
        Mode::Insert => Action::ModeBreak,
        Mode::CommandLine => Action::CancelLine,
        Mode::Normal => Action::Noop,
    }
}

/// Collect a CSI body up to its final byte and map it to a motion.
///
/// A sequence cut short by silence, or one we don't know, maps to `None`.
fn decode_csi(src: &mut impl ByteSource) -> io::Result<Option<Action>> {
    let mut params = Vec::with_capacity(4);
    while params.len() < MAX_CSI_LEN {
        let Some(byte) = src.read_byte()? else {
            return Ok(None);
        };
        match byte {
            0x40..=0x7e => return Ok(csi_key(&params, byte)),
            0x20..=0x3f => params.push(byte),
            _ => return Ok(None),
        }
    }
    Ok(None)
}

fn csi_key(params: &[u8], final_byte: u8) -> Option<Action> {
    match (params, final_byte) {
        (_, b'A') => Some(Action::MoveUp),
        (_, b'B') => Some(Action::MoveDown),
        (_, b'C') => Some(Action::MoveRight),
        (_, b'D') => Some(Action::MoveLeft),
        (_, b'H') | (b"1" | b"7", b'~') => Some(Action::LineStart),
        (_, b'F') | (b"4" | b"8", b'~') => Some(Action::LineEnd),
        (b"5", b'~') => Some(Action::PageUp),
        (b"6", b'~') => Some(Action::PageDown),
        _ => None,
    }
}

const fn ss3_key(byte: u8) -> Option<Action> {
    match byte {
        b'A' => Some(Action::MoveUp),
        b'B' => Some(Action::MoveDown),
        b'C' => Some(Action::MoveRight),
        b'D' => Some(Action::MoveLeft),
        b'H' => Some(Action::LineStart),
        b'F' => Some(Action::LineEnd),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Single-byte tables
// ---------------------------------------------------------------------------

const fn normal(byte: u8) -> Action {
    match byte {
        b'h' | BACKSPACE => Action::MoveLeft,
        b'j' => Action::MoveDown,
        b'k' => Action::MoveUp,
        b'l' => Action::MoveRight,
        b'0' => Action::LineStart,
        b'^' => Action::FirstNonBlank,
        b'$' => Action::LineEnd,
        ENTER => Action::NextLineStart,
        b'i' => Action::EnterInsert,
        b'/' => Action::EnterSearch { forward: true },
        b'?' => Action::EnterSearch { forward: false },
        b'n' => Action::SearchNext,
        b'N' => Action::SearchPrev,
        _ if byte == ctrl(b'h') => Action::MoveLeft,
        _ if byte == ctrl(b'u') => Action::HalfPageUp,
        _ if byte == ctrl(b'd') => Action::HalfPageDown,
        _ if byte == ctrl(b'b') => Action::PageUp,
        _ if byte == ctrl(b'f') => Action::PageDown,
        _ if byte == ctrl(b'l') => Action::Redraw,
        _ => Action::Noop,
    }
}

const fn insert(byte: u8) -> Action {
    match byte {
        ENTER => Action::InsertNewline,
        BACKSPACE => Action::DeleteBack,
        _ if byte == ctrl(b'h') => Action::DeleteBack,
        _ if byte == ctrl(b'l') => Action::Redraw,
        TAB | 0x20..=0x7e | 0x80..=0xff => Action::Literal(byte),
        _ => Action::Noop,
    }
}

const fn command_line(byte: u8) -> Action {
    match byte {
        ENTER => Action::CommitLine,
        BACKSPACE => Action::Erase,
        _ if byte == ctrl(b'h') => Action::Erase,
        0x20..=0x7e => Action::Literal(byte),
        _ => Action::Noop,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use pretty_assertions::assert_eq;

    fn src(bytes: &[u8]) -> VecDeque<u8> {
        bytes.iter().copied().collect()
    }

    /// Decode every key in `bytes` under one mode.
    fn decode_all(mode: Mode, bytes: &[u8]) -> Vec<Action> {
        let mut dec = KeyDecoder::default();
        let mut input = src(bytes);
        let mut out = Vec::new();
        while let Some(action) = dec.next_action(mode, &mut input).unwrap() {
            out.push(action);
        }
        out
    }

    fn one(mode: Mode, bytes: &[u8]) -> Action {
        let actions = decode_all(mode, bytes);
        assert_eq!(actions.len(), 1, "expected one action from {bytes:?}: {actions:?}");
        actions[0]
    }

    // -- Idle ---------------------------------------------------------------

    #[test]
    fn no_byte_is_no_action() {
        let mut dec = KeyDecoder::default();
        assert_eq!(dec.next_action(Mode::Normal, &mut src(b"")).unwrap(), None);
    }

    // -- Normal mode --------------------------------------------------------

    #[test]
    fn normal_motions() {
        assert_eq!(
            decode_all(Mode::Normal, b"hjkl0^$"),
            [
                Action::MoveLeft,
                Action::MoveDown,
                Action::MoveUp,
                Action::MoveRight,
                Action::LineStart,
                Action::FirstNonBlank,
                Action::LineEnd,
            ]
        );
    }

    #[test]
    fn normal_paging() {
        assert_eq!(
            decode_all(Mode::Normal, &[ctrl(b'u'), ctrl(b'd'), ctrl(b'b'), ctrl(b'f')]),
            [
                Action::HalfPageUp,
                Action::HalfPageDown,
                Action::PageUp,
                Action::PageDown,
            ]
        );
    }

    #[test]
    fn normal_search_and_insert_keys() {
        assert_eq!(
            decode_all(Mode::Normal, b"/?nNi"),
            [
                Action::EnterSearch { forward: true },
                Action::EnterSearch { forward: false },
                Action::SearchNext,
                Action::SearchPrev,
                Action::EnterInsert,
            ]
        );
    }

    #[test]
    fn normal_enter_backspace_and_redraw() {
        assert_eq!(one(Mode::Normal, b"\r"), Action::NextLineStart);
        assert_eq!(one(Mode::Normal, &[BACKSPACE]), Action::MoveLeft);
        assert_eq!(one(Mode::Normal, &[ctrl(b'l')]), Action::Redraw);
    }

    #[test]
    fn normal_unmapped_bytes_are_noops() {
        assert_eq!(decode_all(Mode::Normal, b"xZ\t"), [Action::Noop; 3]);
    }

    // -- Leader -------------------------------------------------------------

    #[test]
    fn leader_table() {
        assert_eq!(one(Mode::Normal, b" q"), Action::Quit);
        assert_eq!(one(Mode::Normal, b" w"), Action::Save);
        assert_eq!(one(Mode::Normal, b" c"), Action::ClearSearch);
    }

    #[test]
    fn leader_unknown_second_byte_is_consumed() {
        assert_eq!(decode_all(Mode::Normal, b" xj"), [Action::LeaderNoop, Action::MoveDown]);
    }

    #[test]
    fn leader_without_follow_up() {
        assert_eq!(one(Mode::Normal, b" "), Action::LeaderNoop);
    }

    #[test]
    fn custom_leader() {
        let mut dec = KeyDecoder::new(b',');
        let mut input = src(b",q ");
        assert_eq!(dec.next_action(Mode::Normal, &mut input).unwrap(), Some(Action::Quit));
        assert_eq!(dec.next_action(Mode::Normal, &mut input).unwrap(), Some(Action::Noop));
    }

    #[test]
    fn leader_is_literal_outside_normal() {
        assert_eq!(one(Mode::Insert, b" "), Action::Literal(b' '));
        assert_eq!(one(Mode::CommandLine, b" "), Action::Literal(b' '));
    }

    // -- Insert mode --------------------------------------------------------

    #[test]
    fn insert_letters_are_literal() {
        assert_eq!(
            decode_all(Mode::Insert, b"hj/"),
            [Action::Literal(b'h'), Action::Literal(b'j'), Action::Literal(b'/')]
        );
    }

    #[test]
    fn insert_editing_keys() {
        assert_eq!(one(Mode::Insert, b"\r"), Action::InsertNewline);
        assert_eq!(one(Mode::Insert, &[BACKSPACE]), Action::DeleteBack);
        assert_eq!(one(Mode::Insert, b"\t"), Action::Literal(b'\t'));
    }

    #[test]
    fn insert_ignores_other_controls() {
        assert_eq!(one(Mode::Insert, &[ctrl(b'u')]), Action::Noop);
        assert_eq!(one(Mode::Insert, &[0x00]), Action::Noop);
    }

    #[test]
    fn lone_escape_in_insert_breaks_mode() {
        assert_eq!(one(Mode::Insert, &[ESC]), Action::ModeBreak);
    }

    #[test]
    fn escape_then_letter_in_insert_holds_letter_back() {
        let mut dec = KeyDecoder::default();
        let mut input = src(b"\x1bj");
        assert_eq!(dec.next_action(Mode::Insert, &mut input).unwrap(), Some(Action::ModeBreak));
        assert_eq!(dec.next_action(Mode::Normal, &mut input).unwrap(), Some(Action::MoveDown));
    }

    // -- Escape sequences ---------------------------------------------------

    #[test]
    fn arrows_csi_and_ss3() {
        for mode in [Mode::Normal, Mode::Insert] {
            assert_eq!(
                decode_all(mode, b"\x1b[A\x1b[B\x1b[C\x1b[D\x1bOA\x1bOD"),
                [
                    Action::MoveUp,
                    Action::MoveDown,
                    Action::MoveRight,
                    Action::MoveLeft,
                    Action::MoveUp,
                    Action::MoveLeft,
                ]
            );
        }
    }

    #[test]
    fn home_end_page_keys() {
        assert_eq!(
            decode_all(
                Mode::Normal,
                b"\x1b[H\x1b[F\x1b[1~\x1b[4~\x1b[7~\x1b[8~\x1b[5~\x1b[6~\x1bOH\x1bOF"
            ),
            [
                Action::LineStart,
                Action::LineEnd,
                Action::LineStart,
                Action::LineEnd,
                Action::LineStart,
                Action::LineEnd,
                Action::PageUp,
                Action::PageDown,
                Action::LineStart,
                Action::LineEnd,
            ]
        );
    }

    #[test]
    fn modified_arrow_still_moves() {
        assert_eq!(one(Mode::Normal, b"\x1b[1;5C"), Action::MoveRight);
    }

    #[test]
    fn unknown_sequences_are_consumed() {
        assert_eq!(decode_all(Mode::Normal, b"\x1b[3~\x1b[15~j"), [
            Action::Noop,
            Action::Noop,
            Action::MoveDown,
        ]);
    }

    #[test]
    fn truncated_sequence_is_noop() {
        assert_eq!(one(Mode::Normal, b"\x1b[1"), Action::Noop);
        assert_eq!(one(Mode::Insert, b"\x1bO"), Action::Noop);
    }

    #[test]
    fn lone_escape_in_normal_is_noop() {
        assert_eq!(one(Mode::Normal, &[ESC]), Action::Noop);
    }

    // -- CommandLine mode ---------------------------------------------------

    #[test]
    fn command_line_keys() {
        assert_eq!(
            decode_all(Mode::CommandLine, b"fo\x7f\r"),
            [
                Action::Literal(b'f'),
                Action::Literal(b'o'),
                Action::Erase,
                Action::CommitLine,
            ]
        );
    }

    #[test]
    fn command_line_escape_cancels() {
        assert_eq!(one(Mode::CommandLine, &[ESC]), Action::CancelLine);
    }

    #[test]
    fn command_line_ignores_arrows_and_controls() {
        assert_eq!(
            decode_all(Mode::CommandLine, b"\x1b[A\t\x01"),
            [Action::Noop; 3]
        );
    }

    #[test]
    fn command_line_escape_then_byte() {
        assert_eq!(
            decode_all(Mode::CommandLine, b"\x1bx"),
            [Action::CancelLine, Action::Literal(b'x')]
        );
    }
}
