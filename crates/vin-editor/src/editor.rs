//! The editor controller.
//!
//! [`Editor`] owns all editor state (document, cursor, viewport, mode, match
//! cache, prompt, status message) and is the only thing that mutates it.
//! Each turn of the main loop is:
//!
//! ```text
//! render(out) → step(src) → dispatch(action) → render(out) → ...
//! ```
//!
//! The controller never touches the terminal. Bytes come in through a
//! [`ByteSource`], frames go out through any `impl Write`, and files go
//! through a [`FileStore`], so the whole loop runs in tests against scripted
//! input and an in-memory store.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use vin_term::reader::ByteSource;

use crate::buffer::Document;
use crate::cursor::Cursor;
use crate::key::{Action, KeyDecoder};
use crate::mode::Mode;
use crate::options::Options;
use crate::prompt::{Prompt, PromptKind, SavedView};
use crate::search::{Match, MatchCache, SearchDirection};
use crate::store::{DiskStore, FileStore, StoreError};
use crate::view::{self, Frame, StatusMessage, Viewport};

/// Shown once at startup.
pub const HELP_MESSAGE: &str = "HELP: Leader(Space)-Q = quit";

/// What the main loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Editor state plus the dispatch logic that drives it.
#[derive(Debug)]
pub struct Editor<S = DiskStore> {
    doc: Document,
    cursor: Cursor,
    viewport: Viewport,
    mode: Mode,

    /// Matches of the last search. Survives the prompt so `n`/`N` work in
    /// Normal mode; dropped by leader-`c` or a new search.
    matches: Option<MatchCache>,

    /// The active command-line prompt. `Some` exactly when `mode` is
    /// `CommandLine`.
    prompt: Option<Prompt>,

    message: Option<StatusMessage>,
    options: Options,

    /// Quit commands still needed before a dirty document is abandoned.
    quit_remaining: usize,

    decoder: KeyDecoder,
    store: S,
}

impl<S: FileStore> Editor<S> {
    /// An editor with an empty, unnamed document.
    pub fn new(options: Options, store: S) -> Self {
        Self {
            doc: Document::new(options.tab_stop),
            cursor: Cursor::ORIGIN,
            viewport: Viewport::default(),
            mode: Mode::Normal,
            matches: None,
            prompt: None,
            message: None,
            quit_remaining: options.quit_times,
            decoder: KeyDecoder::new(options.leader_byte()),
            options,
            store,
        }
    }

    /// Load `path` into a fresh document bound to that path.
    ///
    /// A file that doesn't exist yet opens as an empty document; the first
    /// save creates it.
    ///
    /// # Errors
    ///
    /// Any read failure other than "not found".
    pub fn open(&mut self, path: &Path) -> Result<(), StoreError> {
        let lines = match self.store.read_lines(path) {
            Ok(lines) => lines,
            Err(err) if err.io_error().kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut doc = Document::from_lines(lines, self.options.tab_stop);
        doc.set_path(path);
        tracing::info!(path = %path.display(), rows = doc.num_rows(), "opened");

        self.doc = doc;
        self.cursor = Cursor::ORIGIN;
        self.viewport.row_offset = 0;
        self.viewport.col_offset = 0;
        self.matches = None;
        Ok(())
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn matches(&self) -> Option<&MatchCache> {
        self.matches.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // -- Status message -----------------------------------------------------

    /// Replace the status message, timestamped `now`.
    pub fn set_message(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some(StatusMessage::new(text, now));
    }

    /// What the message bar shows at `now`: the prompt line while a prompt
    /// is open, otherwise the status message if it hasn't expired.
    #[must_use]
    pub fn message_line(&self, now: Instant) -> String {
        if let Some(prompt) = &self.prompt {
            return prompt.line();
        }
        self.message
            .as_ref()
            .and_then(|m| m.visible(now, self.options.message_ttl()))
            .map(str::to_owned)
            .unwrap_or_default()
    }

    // -- Frame --------------------------------------------------------------

    /// Fit the text area to a terminal of `rows` x `cols`.
    pub const fn resize(&mut self, rows: usize, cols: usize) {
        self.viewport.fit_window(rows, cols);
    }

    /// Scroll around the cursor and write one frame to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn render(&mut self, out: &mut impl Write, now: Instant) -> io::Result<()> {
        self.viewport.scroll(&self.doc, self.cursor);
        let message = self.message_line(now);
        let frame = Frame {
            doc: &self.doc,
            cursor: self.cursor,
            viewport: &self.viewport,
            mode: self.mode,
            message: &message,
        };
        view::render_frame(out, &frame)
    }

    // -- Input --------------------------------------------------------------

    /// Decode one key from `src` and dispatch it.
    ///
    /// Nothing arriving within the read window is not an error; the loop
    /// just continues (and re-renders, which is how messages expire).
    ///
    /// # Errors
    ///
    /// Propagates read failures from `src`.
    pub fn step(&mut self, src: &mut impl ByteSource, now: Instant) -> io::Result<Control> {
        match self.decoder.next_action(self.mode, src)? {
            Some(action) => Ok(self.dispatch(action, now)),
            None => Ok(Control::Continue),
        }
    }

    /// Apply one action to the editor state.
    pub fn dispatch(&mut self, action: Action, now: Instant) -> Control {
        if action != Action::Quit {
            self.quit_remaining = self.options.quit_times;
        }

        if self.mode == Mode::CommandLine {
            self.dispatch_prompt(action, now);
            return Control::Continue;
        }

        match action {
            Action::Quit => return self.quit(now),
            Action::Save => self.save(now),
            Action::ClearSearch => {
                if self.matches.take().is_some() {
                    tracing::debug!("search matches cleared");
                }
            }

            Action::MoveLeft => self.cursor.move_left(&self.doc),
            Action::MoveRight => self.cursor.move_right(&self.doc),
            Action::MoveUp => self.cursor.move_up(&self.doc),
            Action::MoveDown => self.cursor.move_down(&self.doc),
            Action::LineStart => self.cursor.line_start(),
            Action::FirstNonBlank => self.cursor.first_non_blank(&self.doc),
            Action::LineEnd => self.cursor.line_end(&self.doc),
            Action::NextLineStart => {
                self.cursor.move_down(&self.doc);
                self.cursor.first_non_blank(&self.doc);
            }
            Action::HalfPageUp => {
                let half = self.viewport.screen_rows / 2;
                self.cursor.move_up_by(&self.doc, half);
            }
            Action::HalfPageDown => {
                let half = self.viewport.screen_rows / 2;
                self.cursor.move_down_by(&self.doc, half);
            }
            Action::PageUp => {
                let (offset, rows) = (self.viewport.row_offset, self.viewport.screen_rows);
                self.cursor.page_up(&self.doc, offset, rows);
            }
            Action::PageDown => {
                let (offset, rows) = (self.viewport.row_offset, self.viewport.screen_rows);
                self.cursor.page_down(&self.doc, offset, rows);
            }

            Action::EnterInsert => self.set_mode(Mode::Insert),
            Action::ModeBreak => self.set_mode(Mode::Normal),
            Action::EnterSearch { forward } => {
                self.start_search(SearchDirection::from_forward(forward));
            }

            Action::SearchNext => {
                if let Some(m) = self.matches.as_mut().map(MatchCache::next) {
                    self.jump_to(m);
                }
            }
            Action::SearchPrev => {
                if let Some(m) = self.matches.as_mut().map(MatchCache::previous) {
                    self.jump_to(m);
                }
            }

            Action::InsertNewline => self.insert_newline(),
            Action::DeleteBack => self.delete_back(),
            Action::Literal(byte) => self.insert_byte(byte),

            Action::LeaderNoop
            | Action::CommitLine
            | Action::CancelLine
            | Action::Erase
            | Action::Redraw
            | Action::Noop => {}
        }
        Control::Continue
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
    }

    // -- Quit and save ------------------------------------------------------

    fn quit(&mut self, now: Instant) -> Control {
        if self.doc.is_dirty() && self.quit_remaining > 1 {
            self.quit_remaining -= 1;
            self.set_message(
                format!(
                    "Warning, unsaved changes. Quit {} more times to exit.",
                    self.quit_remaining
                ),
                now,
            );
            return Control::Continue;
        }
        tracing::info!(dirty = self.doc.dirty(), "quit");
        Control::Quit
    }

    /// Write the document to its path, or ask for one first.
    fn save(&mut self, now: Instant) {
        let Some(path) = self.doc.path().map(Path::to_path_buf) else {
            self.open_prompt(Prompt::save_as());
            return;
        };

        let bytes = self.doc.to_serialized_bytes();
        match self.store.write_all(&path, &bytes) {
            Ok(written) => {
                self.doc.mark_clean();
                tracing::info!(path = %path.display(), bytes = written, "saved");
                self.set_message(
                    format!(
                        "\"{}\" {}L, {written}B written",
                        path.display(),
                        self.doc.num_rows()
                    ),
                    now,
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, cause = %err.io_error(), "save failed");
                self.set_message(format!("Can't save! I/O error: {}", err.io_error()), now);
            }
        }
    }

    // -- Prompt -------------------------------------------------------------

    fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        self.set_mode(Mode::CommandLine);
    }

    fn close_prompt(&mut self) -> Option<Prompt> {
        self.set_mode(Mode::Normal);
        self.prompt.take()
    }

    fn dispatch_prompt(&mut self, action: Action, now: Instant) {
        match action {
            Action::Literal(byte) => {
                if self.prompt.as_mut().is_some_and(|p| p.push(byte)) {
                    self.prompt_changed();
                }
            }
            Action::Erase => {
                if self.prompt.as_mut().is_some_and(Prompt::erase) {
                    self.prompt_changed();
                }
            }
            Action::CommitLine => self.commit_prompt(now),
            Action::CancelLine => self.cancel_prompt(now),
            _ => {}
        }
    }

    /// Re-run the incremental search after the query changed.
    fn prompt_changed(&mut self) {
        let Some(prompt) = &self.prompt else { return };
        let PromptKind::Search { direction, saved } = prompt.kind() else {
            return;
        };
        let query = prompt.input().to_vec();

        self.matches = MatchCache::build(&self.doc, &query, direction, saved.cursor.row);
        match self.matches.as_ref().map(MatchCache::current) {
            Some(m) => self.jump_to(m),
            None => saved.restore(&mut self.cursor, &mut self.viewport),
        }
        tracing::debug!(
            query = %String::from_utf8_lossy(&query),
            matches = self.matches.as_ref().map_or(0, MatchCache::len),
            "search updated"
        );
    }

    fn commit_prompt(&mut self, now: Instant) {
        let Some(prompt) = self.close_prompt() else { return };
        if prompt.input().is_empty() {
            self.abandon(prompt.kind(), now);
            return;
        }

        match prompt.kind() {
            PromptKind::SaveAs => {
                let name = String::from_utf8_lossy(prompt.input()).into_owned();
                self.doc.set_path(PathBuf::from(name));
                self.save(now);
            }
            PromptKind::Search { .. } => {
                self.message = None;
            }
        }
    }

    fn cancel_prompt(&mut self, now: Instant) {
        if let Some(prompt) = self.close_prompt() {
            self.abandon(prompt.kind(), now);
        }
    }

    fn abandon(&mut self, kind: PromptKind, now: Instant) {
        match kind {
            PromptKind::SaveAs => self.set_message("Save aborted", now),
            PromptKind::Search { saved, .. } => {
                saved.restore(&mut self.cursor, &mut self.viewport);
                self.matches = None;
                self.message = None;
            }
        }
    }

    // -- Search -------------------------------------------------------------

    fn start_search(&mut self, direction: SearchDirection) {
        self.matches = None;
        let saved = SavedView::capture(self.cursor, &self.viewport);
        self.open_prompt(Prompt::search(direction, saved));
    }

    /// Move to `m`. The cache outlives edits, so the target is clamped to
    /// what the document holds now.
    fn jump_to(&mut self, m: Match) {
        self.cursor = Cursor::new(m.col, m.row);
        self.cursor.clamp(&self.doc);
        self.viewport.row_offset = m.row_offset.min(self.cursor.row);
    }

    // -- Insert mode --------------------------------------------------------

    fn insert_byte(&mut self, byte: u8) {
        if self.mode != Mode::Insert {
            return;
        }
        if self.cursor.row == self.doc.num_rows() {
            self.doc.insert_row(self.doc.num_rows(), b"");
        }
        if self.doc.insert_char(self.cursor.row, self.cursor.col, byte) > 0 {
            self.cursor.col += 1;
        }
    }

    /// Split at the cursor; at column 0 open an empty row above instead.
    fn insert_newline(&mut self) {
        if self.cursor.col == 0 {
            self.doc.insert_row(self.cursor.row, b"");
        } else {
            self.doc.split_row(self.cursor.row, self.cursor.col);
        }
        self.cursor = Cursor::new(0, self.cursor.row + 1);
    }

    /// Delete the byte before the cursor, or join onto the previous row at
    /// column 0.
    fn delete_back(&mut self) {
        let Cursor { col, row } = self.cursor;
        if row == self.doc.num_rows() || (col == 0 && row == 0) {
            return;
        }

        if col > 0 {
            self.doc.delete_char(row, col);
            self.cursor.col -= 1;
            return;
        }

        let prev_len = self.doc.row_len(row - 1);
        let tail = self
            .doc
            .row(row)
            .map(|r| r.chars().to_vec())
            .unwrap_or_default();
        self.doc.append_row_content(row - 1, &tail);
        self.doc.delete_row(row);
        self.cursor = Cursor::new(prev_len, row - 1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
