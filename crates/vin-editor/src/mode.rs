//! Modal editing.
//!
//! The editor is always in exactly one [`Mode`]. The mode gates how the key
//! decoder interprets bytes and which cursor shape the terminal shows:
//!
//! | Mode        | Cursor shape | Purpose                       |
//! |-------------|--------------|-------------------------------|
//! | Normal      | Block        | Navigation, leader commands   |
//! | Insert      | Bar          | Typing text                   |
//! | CommandLine | Block        | Search and save-as prompts    |

use std::fmt;

use vin_term::ansi::CursorShape;

/// The current editing mode.
///
/// Pure data: what mode we're in, not how keys are handled. Decoding lives
/// in [`key`](crate::key), transitions in [`editor`](crate::editor).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are motions and commands.
    #[default]
    Normal,
    /// Keys produce bytes in the document.
    Insert,
    /// Keys edit the prompt on the message line.
    CommandLine,
}

impl Mode {
    /// Human-readable name, for logs.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::CommandLine => "COMMAND",
        }
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal | Self::CommandLine => CursorShape::SteadyBlock,
            Self::Insert => CursorShape::SteadyBar,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(Mode::Insert.to_string(), "INSERT");
        assert_eq!(Mode::CommandLine.to_string(), "COMMAND");
    }

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::SteadyBlock);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::SteadyBar);
        assert_eq!(Mode::CommandLine.cursor_shape(), CursorShape::SteadyBlock);
    }
}
