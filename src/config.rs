//! Command-line options.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::board::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::device::DEFAULT_BAUD_RATE;
use crate::game::{GameConfig, DEVICE_MOVE_INTERVAL_MS, DROP_INTERVAL_MS, MOVE_INTERVAL_MS};

/// Smallest board that still fits the 4x4 I piece.
const MIN_BOARD_SIDE: usize = 4;
/// Largest board side; keeps cell coordinates well inside `i16`.
const MAX_BOARD_SIDE: usize = 200;

/// Falling-block puzzle in the terminal, playable from the keyboard or a serial controller.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "serial-tetris",
    version,
    about = "Falling-block puzzle in the terminal with optional serial-device input.",
    long_about = "Falling-block puzzle in the terminal with optional serial-device input.\n\n\
        CONTROLS:\n  a / d   Move (hold to repeat)   s      Soft drop\n  \
        w       Rotate CW                z      Rotate CCW\n  \
        Space   Hard drop                r      Reset\n  \
        Enter   Start                    c      Connect serial device\n  \
        q / Esc Quit\n\n\
        A serial device sends one token per line: LEFT, RIGHT, DOWN, ROTATE, DROP."
)]
pub struct Args {
    /// Board width in cells.
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS")]
    pub width: usize,

    /// Board height in cells.
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS")]
    pub height: usize,

    /// Gravity interval in milliseconds.
    #[arg(long, default_value_t = DROP_INTERVAL_MS, value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Horizontal repeat interval while a/d is held.
    #[arg(long, default_value_t = MOVE_INTERVAL_MS, value_name = "MS")]
    pub move_interval_ms: u64,

    /// Horizontal repeat interval right after a serial-device command.
    #[arg(long, default_value_t = DEVICE_MOVE_INTERVAL_MS, value_name = "MS")]
    pub device_move_interval_ms: u64,

    /// Serial device path (e.g. /dev/ttyUSB0). Press `c` in game to connect.
    #[arg(short, long, value_name = "PATH")]
    pub device: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Connect to --device at startup instead of waiting for `c`.
    #[arg(long, requires = "device")]
    pub connect: bool,

    /// Best-score file. Defaults to the user config directory.
    #[arg(long, value_name = "FILE")]
    pub score_file: Option<PathBuf>,

    /// Log file (the terminal is taken by the game).
    #[arg(long, default_value = "serial-tetris.log", value_name = "FILE")]
    pub log_file: PathBuf,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value_t = Level::INFO, value_name = "LEVEL")]
    pub log_level: Level,

    /// Disable the terminal bell cues.
    #[arg(long)]
    pub mute: bool,

    /// Skip the menu and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width.clamp(MIN_BOARD_SIDE, MAX_BOARD_SIDE),
            height: self.height.clamp(MIN_BOARD_SIDE, MAX_BOARD_SIDE),
            drop_interval_ms: self.drop_interval_ms,
            move_interval_ms: self.move_interval_ms,
            device_move_interval_ms: self.device_move_interval_ms,
        }
    }

    pub fn score_path(&self) -> PathBuf {
        self.score_file
            .clone()
            .unwrap_or_else(crate::highscore::default_path)
    }
}
