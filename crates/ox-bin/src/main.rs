//! Oxidized entrypoint: a synchronous, single-threaded readline REPL driving
//! `core-model::EditorCore` over a real terminal.
//!
//! The teacher's original binary ran an async event loop (`tokio::mpsc`
//! channel, a spawned input task, a tick source) feeding a full-screen,
//! multi-view `EditorModel`/`RenderEngine`. `EditorCore::read_line` is a
//! blocking call that owns its own input loop internally (`BindingReader`
//! blocks on `Console::read`), so there's no event channel or background
//! task left to run — `core-events`' own doc comment already describes the
//! editor as "single-threaded and cooperatively scheduled", which here means
//! literally one thread, one call stack, no `tokio::main` at all.

use anyhow::Result;
use clap::Parser;
use core_completion::NoopCompleter;
use core_config::load_from;
use core_history::VecHistory;
use core_model::{EditorCore, ReadLineOutcome};
use core_render::Display;
use core_terminal::{CrosstermBackend, CrosstermConsole, TerminalBackend};
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxidized", version, about = "Oxidized line editor")]
struct Args {
    /// Optional configuration file path (overrides discovery of `editor.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Start in vi-insert rather than emacs keybindings.
    #[arg(long)]
    vi: bool,
    /// Prompt string to display.
    #[arg(long, default_value = "> ")]
    prompt: String,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_path = std::path::Path::new(".").join("oxidized.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }
        let file_appender = tracing_appender::rolling::never(".", "oxidized.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => self.log_guard = Some(guard),
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Moves the cursor past the just-drawn line. Raw mode doesn't translate
/// `\n` to `\r\n`, and `Display` never prints a trailing newline itself —
/// it only knows the wrapped-line frame, not when a read_line call ends.
fn advance_past_line() -> Result<()> {
    let mut out = stdout();
    write!(out, "\r\n")?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone());
    let mut core = EditorCore::new(config);
    if args.vi {
        core.set_initial_keymap("vi-insert");
    }

    let mut backend = CrosstermBackend::new();
    backend.enter()?;

    let mut console = CrosstermConsole::new();
    let mut history = VecHistory::new();
    let completer = NoopCompleter;
    let mut display = Display::new(core.config().tab_width());

    loop {
        let outcome = core.read_line(
            &mut console,
            &mut history,
            &completer,
            &mut display,
            args.prompt.clone(),
        )?;

        match outcome {
            ReadLineOutcome::Line(line) => {
                advance_past_line()?;
                info!(target: "runtime", line = %line, "accepted_line");
            }
            ReadLineOutcome::Interrupted(_) => {
                advance_past_line()?;
                info!(target: "runtime", "interrupted");
            }
            ReadLineOutcome::Eof => {
                advance_past_line()?;
                info!(target: "runtime", "eof");
                break;
            }
        }
    }

    backend.leave()?;
    info!(target: "runtime", "shutdown");
    Ok(())
}
