//! Audio cues for lock-in, line clears and board resets.

use std::io::Write;

use tracing::debug;

use crate::error::AudioError;
use crate::game::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Drop,
    Line,
    Reset,
}

impl Cue {
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::PieceLocked => Some(Cue::Drop),
            GameEvent::LineCleared => Some(Cue::Line),
            GameEvent::GameOver { .. } => Some(Cue::Reset),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cue::Drop => "drop",
            Cue::Line => "line",
            Cue::Reset => "reset",
        }
    }
}

pub trait CuePlayer {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
}

/// Rings the terminal bell on every cue.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CuePlayer for TerminalBell<W> {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl CuePlayer for Silent {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Plays a cue, ignoring playback failures.
pub fn play(player: &mut dyn CuePlayer, cue: Cue) {
    if let Err(e) = player.play(cue) {
        debug!(cue = cue.name(), error = %e, "cue playback failed");
    }
}
