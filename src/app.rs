//! App: frame loop, key handling, device polling, and the side effects of game events.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tracing::{info, warn};

use crate::audio::{self, Cue, CuePlayer};
use crate::command::Command;
use crate::config::Args;
use crate::device::DeviceReader;
use crate::error::DeviceError;
use crate::game::{Game, GameEvent};
use crate::highscore;
use crate::input::{key_to_action, Action, KeyTracker, DEFAULT_RELEASE_TIMEOUT};
use crate::ui;

/// ~60 frames per second.
const FRAME_DURATION: Duration = Duration::from_millis(16);

pub struct App {
    game: Game,
    keys: KeyTracker,
    device: Option<DeviceReader>,
    device_path: Option<String>,
    baud_rate: u32,
    cues: Box<dyn CuePlayer>,
    score_path: PathBuf,
    device_status: String,
}

impl App {
    pub fn new(args: &Args, cues: Box<dyn CuePlayer>) -> Self {
        let score_path = args.score_path();
        let best_score = highscore::load_best_score(&score_path);
        info!(path = %score_path.display(), best_score, "loaded best score");

        let mut game = Game::new(args.game_config(), best_score);
        if args.no_menu {
            game.start();
        }

        let device_status = match &args.device {
            Some(path) => format!("Device: {path} (press C to connect)"),
            None => "Device: none configured".to_string(),
        };

        Self {
            game,
            keys: KeyTracker::default(),
            device: None,
            device_path: args.device.clone(),
            baud_rate: args.baud,
            cues,
            score_path,
            device_status,
        }
    }

    pub fn with_game(mut self, game: Game) -> Self {
        self.game = game;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn device_status(&self) -> &str {
        &self.device_status
    }

    /// With release reporting on, held keys last until released; otherwise they time out.
    pub fn set_release_reporting(&mut self, reported: bool) {
        self.keys = KeyTracker::new((!reported).then_some(DEFAULT_RELEASE_TIMEOUT));
    }

    /// Opens the configured serial device. Failures are logged and shown; play continues.
    pub fn connect_device(&mut self) {
        if self.device.as_ref().is_some_and(DeviceReader::is_connected) {
            return;
        }
        let result = self
            .device_path
            .as_deref()
            .ok_or(DeviceError::NotConfigured)
            .and_then(|path| DeviceReader::connect(path, self.baud_rate));
        match result {
            Ok(reader) => self.attach_device(reader),
            Err(e) => {
                warn!(error = %e, "serial connection failed");
                self.device_status = format!("Device: {e}");
            }
        }
    }

    pub fn attach_device(&mut self, reader: DeviceReader) {
        self.device_status = format!("Device: connected to {}", reader.name());
        self.device = Some(reader);
    }

    /// Handles one key event. Returns false when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let Some(action) = key_to_action(key) else {
            return true;
        };

        if let Action::Hold(side) = action {
            self.keys.handle(side, key.kind, now);
            return true;
        }
        // Auto-repeat re-applies game commands, except Start.
        let repeatable = matches!(action, Action::Game(command) if command != Command::Start);
        match key.kind {
            KeyEventKind::Press => {}
            KeyEventKind::Repeat if repeatable => {}
            _ => return true,
        }

        match action {
            Action::Game(command) => self.game.apply(command),
            Action::Connect => self.connect_device(),
            Action::Quit => return false,
            Action::Hold(_) => {}
        }
        true
    }

    /// Applies every command the device sent since the last frame.
    pub fn poll_device(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        let connected = device.is_connected();
        let commands = device.poll_commands();

        for command in commands {
            self.game.apply_device_command(command);
        }

        if !connected {
            if let Some(device) = self.device.take() {
                info!(device = device.name(), "serial device disconnected");
                self.device_status = format!("Device: {} disconnected", device.name());
            }
        }
    }

    /// Advances the game clock and handles the resulting events.
    pub fn update(&mut self, delta_ms: u64, now: Instant) {
        if delta_ms > 0 {
            self.game.tick(delta_ms, self.keys.held(now));
        }
        self.process_events();
    }

    fn process_events(&mut self) {
        for event in self.game.take_events() {
            if let Some(cue) = Cue::for_event(&event) {
                audio::play(self.cues.as_mut(), cue);
            }
            if let GameEvent::NewBestScore(score) = event {
                if let Err(e) = highscore::save_best_score(&self.score_path, score) {
                    warn!(error = %e, "could not save best score");
                }
            }
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut last_frame = Instant::now();

        loop {
            terminal.draw(|frame| ui::render(frame, &self.game, &self.device_status))?;

            let timeout = FRAME_DURATION.saturating_sub(last_frame.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) => {
                            if !self.handle_key(key, Instant::now()) {
                                return Ok(());
                            }
                        }
                        Event::FocusLost => self.keys.release_all(),
                        _ => {}
                    }
                }
            }

            self.poll_device();

            let now = Instant::now();
            let delta_ms = now.duration_since(last_frame).as_millis() as u64;
            last_frame += Duration::from_millis(delta_ms);
            self.update(delta_ms, now);
        }
    }
}
