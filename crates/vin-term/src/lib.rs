// SPDX-License-Identifier: MIT
//
// vin-term: the terminal layer of the Vinyard editor.
//
// Direct terminal control via raw termios and hand-written ANSI escape
// sequences. Frames are accumulated in memory and written with a single
// syscall, input is read one byte at a time with a bounded wait, and the
// terminal is restored on every exit path.

pub mod ansi;
pub mod output;
pub mod reader;
pub mod terminal;
