use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use serial_tetris::app::App;
use serial_tetris::audio::{CuePlayer, Silent, TerminalBell};
use serial_tetris::config::Args;

fn init_logging(args: &Args) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let cues: Box<dyn CuePlayer> = if args.mute {
        Box::new(Silent)
    } else {
        Box::new(TerminalBell::new(stdout()))
    };
    let mut app = App::new(&args, cues);
    if args.connect {
        app.connect_device();
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    // Key release events make a/d repeat stop exactly on release.
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    app.set_release_reporting(enhanced);

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let result = app.run(&mut terminal);

    // Restore terminal
    if enhanced {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
