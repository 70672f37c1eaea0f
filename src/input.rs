//! Key bindings and held-key tracking for the horizontal repeat.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::command::Command;
use crate::game::HeldKeys;

/// How long a directional key counts as held without a repeat, when the
/// terminal does not report key releases.
pub const DEFAULT_RELEASE_TIMEOUT: Duration = Duration::from_millis(700);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left,
    Right,
}

/// What a key press asks for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Game(Command),
    Hold(Side),
    Connect,
    Quit,
}

/// Maps a key to an action. Letters are case-insensitive.
pub fn key_to_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Enter => Some(Action::Game(Command::Start)),
        KeyCode::Char(' ') => Some(Action::Game(Command::HardDrop)),
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Some(Action::Hold(Side::Left)),
            'd' => Some(Action::Hold(Side::Right)),
            's' => Some(Action::Game(Command::SoftDrop)),
            'w' => Some(Action::Game(Command::RotateCw)),
            'z' => Some(Action::Game(Command::RotateCcw)),
            'r' => Some(Action::Game(Command::Reset)),
            'c' => Some(Action::Connect),
            'q' => Some(Action::Quit),
            _ => None,
        },
        _ => None,
    }
}

/// Tracks which of `a`/`d` are down.
#[derive(Clone, Debug)]
pub struct KeyTracker {
    left: Option<Instant>,
    right: Option<Instant>,
    /// `None` when the terminal reports releases.
    release_timeout: Option<Duration>,
}

impl KeyTracker {
    pub fn new(release_timeout: Option<Duration>) -> Self {
        Self {
            left: None,
            right: None,
            release_timeout,
        }
    }

    /// Feeds a key event for `side`. Press and repeat refresh, release clears.
    pub fn handle(&mut self, side: Side, kind: KeyEventKind, now: Instant) {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *slot = match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Some(now),
            KeyEventKind::Release => None,
        };
    }

    pub fn release_all(&mut self) {
        self.left = None;
        self.right = None;
    }

    pub fn held(&self, now: Instant) -> HeldKeys {
        HeldKeys {
            left: self.is_down(self.left, now),
            right: self.is_down(self.right, now),
        }
    }

    fn is_down(&self, since: Option<Instant>, now: Instant) -> bool {
        match (since, self.release_timeout) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(at), Some(timeout)) => now.saturating_duration_since(at) < timeout,
        }
    }
}

impl Default for KeyTracker {
    fn default() -> Self {
        Self::new(Some(DEFAULT_RELEASE_TIMEOUT))
    }
}
