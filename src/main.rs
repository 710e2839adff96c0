// SPDX-License-Identifier: MIT
//
// vin: the Vinyard editor binary.
//
// Wires the two crates together:
//
//   vin-term   → raw mode, window size, bounded byte reads, frame output
//   vin-editor → document, modes, key decoding, search, rendering
//
// One loop, one thread:
//
//   window size → resize → render into OutputBuffer → one write
//     → read one key (bounded wait) → dispatch → repeat
//
// The Terminal guard restores the screen and the terminal mode on every
// exit path: normal quit, a fatal error propagated out of the loop, or a
// panic (via the hook installed on enter).

mod dirs;
mod logging;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use vin_editor::editor::{Control, Editor, HELP_MESSAGE};
use vin_editor::options::Options;
use vin_editor::store::DiskStore;
use vin_term::output::OutputBuffer;
use vin_term::reader::StdinBytes;
use vin_term::terminal::{self, Terminal, TerminalError};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "vin", version, about = "Vinyard, a small modal terminal text editor")]
struct Cli {
    /// File to edit. A path that doesn't exist yet is created on first save.
    file: Option<PathBuf>,

    /// Config file to use instead of $XDG_CONFIG_HOME/vin/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs here instead of $XDG_STATE_HOME/vin/logs/vin.log.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        tracing::error!(error = %format!("{err:#}"), "fatal");
        eprintln!("vin: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    logging::init_logging(cli.log_file.as_deref()).context("initialize logging failed")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    if !terminal::is_tty() {
        return Err(TerminalError::NotATerminal).context("start editor failed");
    }

    let options = load_options(cli.config.as_deref())?;
    let mut input = StdinBytes::new(options.escape_timeout());
    let mut editor = Editor::new(options, DiskStore);
    if let Some(path) = &cli.file {
        editor
            .open(path)
            .with_context(|| format!("open {} failed", path.display()))?;
    }
    editor.set_message(HELP_MESSAGE, Instant::now());

    let mut term = Terminal::new();
    term.enter().context("enter raw mode failed")?;
    let result = event_loop(&term, &mut editor, &mut input);
    let restored = term.leave().context("restore terminal failed");

    result?;
    restored
}

/// Render, read, dispatch until the editor asks to quit.
fn event_loop(term: &Terminal, editor: &mut Editor, input: &mut StdinBytes) -> Result<()> {
    let mut out = OutputBuffer::new();
    loop {
        let size = term
            .window_size(input)
            .context("query window size failed")?;
        editor.resize(usize::from(size.rows), usize::from(size.cols));

        editor
            .render(&mut out, Instant::now())
            .context("render frame failed")?;
        out.present().context("write frame failed")?;

        let control = editor
            .step(input, Instant::now())
            .context("read input failed")?;
        if control == Control::Quit {
            return Ok(());
        }
    }
}

/// An explicit `--config` must exist; the default location is optional.
fn load_options(explicit: Option<&Path>) -> Result<Options> {
    if let Some(path) = explicit {
        return Options::load(path).context("load config failed");
    }
    match dirs::user_config_file() {
        Some(path) => Options::load_or_default(&path).context("load config failed"),
        None => Ok(Options::default()),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_accepts_file_and_flags() {
        let cli = Cli::try_parse_from([
            "vin",
            "notes.txt",
            "--config",
            "vin.toml",
            "--log-file",
            "/tmp/vin.log",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(cli.config, Some(PathBuf::from("vin.toml")));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/vin.log")));
    }

    #[test]
    fn cli_without_arguments() {
        let cli = Cli::try_parse_from(["vin"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn cli_rejects_two_files() {
        assert!(Cli::try_parse_from(["vin", "a", "b"]).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vin.toml");
        std::fs::write(&path, "tab_stop = 8\n").unwrap();
        assert_eq!(load_options(Some(&path)).unwrap().tab_stop, 8);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_options(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(format!("{err:#}").starts_with("load config failed: failed to read config file"));
    }

    #[test]
    fn malformed_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vin.toml");
        std::fs::write(&path, "quit_times = 0\n").unwrap();
        let err = load_options(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid `quit_times`"));
    }
}
