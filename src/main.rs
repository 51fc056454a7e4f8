use std::{
    io::{self, Write},
    panic,
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::DisableMouseCapture,
    execute,
    style::ResetColor,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tracing::{info, warn};
use tuirealm::{
    PollStrategy,
    terminal::{CrosstermTerminalAdapter, TerminalBridge},
};

use prep_board::{
    app::{App, AppOptions},
    cli::{self, RootCommand},
    logging::{init_logging, print_log_location},
    realm::{ScreenId, apply_message, init_application, should_quit},
    theme::ThemePreset,
};

#[derive(Parser, Debug)]
#[command(
    name = "prep-board",
    about = "Terminal kanban board for interview preparation",
    long_about = "A TUI kanban board for tracking interview preparation, with pointer and keyboard drag-and-drop between columns.",
    version = env!("PREP_BOARD_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Board snapshot JSON; the built-in sample board is used when omitted.
    #[arg(short, long, global = true, value_name = "PATH")]
    board: Option<PathBuf>,

    #[arg(long, value_name = "PRESET")]
    theme: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

enum RunOutcome {
    Continue,
    Exit(i32),
}

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    let log_path = init_logging()
        .inspect_err(|err| eprintln!("warning: failed to initialize logging: {err}"))
        .ok();
    if let Some(path) = log_path.clone() {
        install_panic_hook_with_log(path);
    }

    let outcome = run_app();
    if let Ok(RunOutcome::Exit(code)) = outcome {
        std::process::exit(code);
    }
    if let Some(path) = log_path.as_ref() {
        print_log_location(path);
    }
    outcome.map(|_| ())
}

fn run_app() -> Result<RunOutcome> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        let code = cli::run(cli.board.as_deref(), command, cli.json, cli.quiet);
        return Ok(RunOutcome::Exit(code));
    }

    let app = App::from_options(AppOptions {
        board_path: cli.board,
        theme_override: cli.theme.as_deref().and_then(parse_theme),
    })
    .context("failed to load board")?;
    info!(
        columns = app.board.columns().len(),
        cards = app.board.card_count(),
        "board loaded"
    );

    run_board(app)?;
    Ok(RunOutcome::Continue)
}

fn parse_theme(value: &str) -> Option<ThemePreset> {
    ThemePreset::from_str(value)
        .inspect_err(|_| warn!(theme = value, "unknown theme preset, keeping configured theme"))
        .ok()
}

fn run_board(app: App) -> Result<()> {
    let _guard = TerminalGuard;
    let mut terminal = setup_terminal()?;

    let app = Arc::new(Mutex::new(app));
    let mut realm = init_application(Arc::clone(&app))?;

    let mut dirty = true;
    while !should_quit(&app)? {
        if dirty {
            terminal
                .draw(|frame| realm.view(&ScreenId::Board, frame, frame.area()))
                .context("failed to render frame")?;
        }

        let messages = realm
            .tick(PollStrategy::UpTo(16))
            .context("failed to process terminal events")?;
        dirty = !messages.is_empty();
        for message in messages {
            apply_message(&app, message)?;
        }
    }

    let _ = terminal.disable_mouse_capture();
    let _ = terminal.disable_raw_mode();
    let _ = terminal.leave_alternate_screen();
    TERMINAL_RESTORED.store(true, Ordering::SeqCst);
    Ok(())
}

fn setup_terminal() -> Result<TerminalBridge<CrosstermTerminalAdapter>> {
    TERMINAL_RESTORED.store(false, Ordering::SeqCst);

    let mut terminal =
        TerminalBridge::new_crossterm().context("failed to initialize terminal bridge")?;

    terminal
        .enable_raw_mode()
        .context("failed to enable raw mode")?;
    terminal
        .enter_alternate_screen()
        .context("failed to enter alternate screen")?;
    terminal
        .enable_mouse_capture()
        .context("failed to enable mouse capture")?;

    Ok(terminal)
}

fn install_panic_hook_with_log(log_path: PathBuf) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        eprintln!();
        eprintln!("  Log file: {}", log_path.display());
        eprintln!();
        previous_hook(panic_info);
    }));
}

fn restore_terminal() -> Result<()> {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let _ = disable_raw_mode();

    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show,
        ResetColor
    );
    // Raw fallback for terminals that ignore the commands above.
    let _ = stderr.write_all(
        b"\x1b[?1049l\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1006l\x1b[?25h\x1b[0m",
    );
    let _ = stderr.flush();

    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}
