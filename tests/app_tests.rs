//! Tests for the app layer: key handling, device polling, cues and score persistence.

use std::cell::RefCell;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serial_tetris::app::App;
use serial_tetris::audio::{Cue, CuePlayer, Silent};
use serial_tetris::board::CellState;
use serial_tetris::config::Args;
use serial_tetris::device::DeviceReader;
use serial_tetris::error::AudioError;
use serial_tetris::game::{test_helpers::*, Game, GameState};
use serial_tetris::piece::{Piece, SequencePieceProvider, TetrominoType};
use tempfile::{tempdir, TempDir};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Cue>>>);

impl CuePlayer for Recorder {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        self.0.borrow_mut().push(cue);
        Ok(())
    }
}

fn args(score_file: &Path, extra: &[&str]) -> Args {
    let mut argv = vec![
        "serial-tetris".to_string(),
        "--score-file".to_string(),
        score_file.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::parse_from(argv)
}

fn playing_app() -> (App, TempDir) {
    let dir = tempdir().unwrap();
    let app = App::new(&args(&dir.path().join("best"), &["--no-menu"]), Box::new(Silent));
    (app, dir)
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn piece_x(app: &App) -> i16 {
    app.game().current_piece.as_ref().unwrap().position.x
}

// ============================================================================
// Startup
// ============================================================================

mod startup {
    use super::*;

    #[test]
    fn loads_best_score_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best");
        fs::write(&path, "42").unwrap();

        let app = App::new(&args(&path, &[]), Box::new(Silent));

        assert_eq!(app.game().best_score, 42);
        assert_eq!(app.game().state, GameState::Menu);
        assert!(app.game().current_piece.is_none());
    }

    #[test]
    fn no_menu_starts_playing() {
        let (app, _dir) = playing_app();
        assert_eq!(app.game().state, GameState::Playing);
        assert!(app.game().current_piece.is_some());
    }

    #[test]
    fn status_mentions_configured_device() {
        let dir = tempdir().unwrap();
        let app = App::new(
            &args(&dir.path().join("best"), &["--device", "/dev/ttyUSB7"]),
            Box::new(Silent),
        );
        assert!(app.device_status().contains("/dev/ttyUSB7"));
    }
}

// ============================================================================
// Keyboard
// ============================================================================

mod keyboard {
    use super::*;

    #[test]
    fn enter_leaves_menu() {
        let dir = tempdir().unwrap();
        let mut app = App::new(&args(&dir.path().join("best"), &[]), Box::new(Silent));

        assert!(app.handle_key(press(KeyCode::Char('s')), Instant::now()));
        assert_eq!(app.game().state, GameState::Menu);

        assert!(app.handle_key(press(KeyCode::Enter), Instant::now()));
        assert_eq!(app.game().state, GameState::Playing);
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let (mut app, _dir) = playing_app();
        assert!(!app.handle_key(press(KeyCode::Char('q')), Instant::now()));
        assert!(!app.handle_key(press(KeyCode::Esc), Instant::now()));
        assert!(!app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now()
        ));
    }

    #[test]
    fn held_key_moves_on_repeat_not_on_press() {
        let (mut app, _dir) = playing_app();
        let x = piece_x(&app);
        let t0 = Instant::now();

        app.handle_key(press(KeyCode::Char('a')), t0);
        assert_eq!(piece_x(&app), x);

        app.update(201, t0);
        assert_eq!(piece_x(&app), x - 1);
    }

    #[test]
    fn held_key_times_out_without_release_events() {
        let (mut app, _dir) = playing_app();
        let x = piece_x(&app);
        let t0 = Instant::now();

        app.handle_key(press(KeyCode::Char('d')), t0);
        app.update(201, t0 + Duration::from_secs(1));

        assert_eq!(piece_x(&app), x);
    }

    #[test]
    fn release_event_stops_repeat() {
        let (mut app, _dir) = playing_app();
        app.set_release_reporting(true);
        let x = piece_x(&app);
        let t0 = Instant::now();

        app.handle_key(press(KeyCode::Char('d')), t0);
        app.update(201, t0 + Duration::from_secs(5));
        assert_eq!(piece_x(&app), x + 1);

        app.handle_key(
            KeyEvent::new_with_kind(KeyCode::Char('d'), KeyModifiers::NONE, KeyEventKind::Release),
            t0,
        );
        app.update(201, t0 + Duration::from_secs(5));
        assert_eq!(piece_x(&app), x + 1);
    }

    #[test]
    fn release_events_do_not_trigger_commands() {
        let (mut app, _dir) = playing_app();
        let y = app.game().current_piece.as_ref().unwrap().position.y;

        app.handle_key(
            KeyEvent::new_with_kind(KeyCode::Char('s'), KeyModifiers::NONE, KeyEventKind::Release),
            Instant::now(),
        );
        assert_eq!(app.game().current_piece.as_ref().unwrap().position.y, y);

        app.handle_key(press(KeyCode::Char('S')), Instant::now());
        assert_eq!(app.game().current_piece.as_ref().unwrap().position.y, y + 1);
    }

    #[test]
    fn auto_repeat_keeps_dropping_with_release_reporting() {
        let game = Game::with_board(empty_board(), Piece::new_at(TetrominoType::O, 4, 0));
        let (app, _dir) = playing_app();
        let mut app = app.with_game(game);
        app.set_release_reporting(true);
        let repeat =
            KeyEvent::new_with_kind(KeyCode::Char('s'), KeyModifiers::NONE, KeyEventKind::Repeat);

        app.handle_key(press(KeyCode::Char('s')), Instant::now());
        for _ in 0..3 {
            app.handle_key(repeat, Instant::now());
        }

        assert_eq!(app.game().current_piece.as_ref().unwrap().position.y, 4);
    }

    #[test]
    fn auto_repeat_does_not_restart_or_reconnect() {
        let dir = tempdir().unwrap();
        let mut app = App::new(&args(&dir.path().join("best"), &[]), Box::new(Silent));
        let repeat = |code| KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Repeat);

        assert!(app.handle_key(repeat(KeyCode::Enter), Instant::now()));
        assert_eq!(app.game().state, GameState::Menu);

        let status = app.device_status().to_string();
        assert!(app.handle_key(repeat(KeyCode::Char('c')), Instant::now()));
        assert_eq!(app.device_status(), status);
    }

    #[test]
    fn connect_without_device_reports_status() {
        let (mut app, _dir) = playing_app();
        assert!(app.handle_key(press(KeyCode::Char('c')), Instant::now()));
        assert!(app.device_status().contains("no serial device configured"));
    }
}

// ============================================================================
// Device
// ============================================================================

mod device {
    use super::*;

    #[test]
    fn device_commands_apply_and_disconnect_is_noticed() {
        let (app, _dir) = playing_app();
        let game = Game::with_board(empty_board(), Piece::new_at(TetrominoType::O, 4, 0));
        let mut app = app.with_game(game);

        let reader = DeviceReader::spawn("loopback", Cursor::new(b"RIGHT\nRIGHT\nDOWN\n".to_vec()))
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while reader.is_connected() {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(5));
        }

        app.attach_device(reader);
        assert!(app.device_status().contains("loopback"));

        app.poll_device();

        let piece = app.game().current_piece.as_ref().unwrap();
        assert_eq!((piece.position.x, piece.position.y), (6, 1));
        assert_eq!(app.game().move_interval(), 10);
        assert!(app.device_status().contains("disconnected"));
    }
}

// ============================================================================
// Events
// ============================================================================

mod events {
    use super::*;

    fn doomed_game(score: u32, best: u32) -> Game {
        let mut board = empty_board();
        board.set(5, 1, CellState::Filled(TetrominoType::S));
        let mut game = Game::with_board(board, Piece::new_at(TetrominoType::O, 0, 10))
            .with_piece_provider(Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
        game.score = score;
        game.best_score = best;
        game
    }

    #[test]
    fn new_best_is_saved_and_cues_play() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores").join("best");
        let recorder = Recorder::default();
        let mut app = App::new(&args(&path, &[]), Box::new(recorder.clone()))
            .with_game(doomed_game(50, 20));

        app.handle_key(press(KeyCode::Char(' ')), Instant::now());
        app.update(0, Instant::now());

        assert_eq!(fs::read_to_string(&path).unwrap(), "50");
        assert_eq!(*recorder.0.borrow(), vec![Cue::Reset, Cue::Drop]);
    }

    #[test]
    fn lower_score_is_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best");
        let mut app = App::new(&args(&path, &[]), Box::new(Silent)).with_game(doomed_game(5, 20));

        app.handle_key(press(KeyCode::Char(' ')), Instant::now());
        app.update(0, Instant::now());

        assert!(!path.exists());
        assert_eq!(app.game().best_score, 20);
    }

    #[test]
    fn line_clear_plays_line_cue() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut board = empty_board();
        fill_row_with_gap(&mut board, 19, 0);
        let game = Game::with_board(board, Piece::new_at(TetrominoType::I, -1, 0))
            .with_piece_provider(Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
        let mut app = App::new(&args(&dir.path().join("best"), &[]), Box::new(recorder.clone()))
            .with_game(game);

        app.handle_key(press(KeyCode::Char(' ')), Instant::now());
        app.update(0, Instant::now());

        assert_eq!(app.game().score, 10);
        assert_eq!(*recorder.0.borrow(), vec![Cue::Line, Cue::Drop]);
    }

    #[test]
    fn manual_reset_plays_no_cue() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut app = App::new(
            &args(&dir.path().join("best"), &["--no-menu"]),
            Box::new(recorder.clone()),
        );

        app.handle_key(press(KeyCode::Char('r')), Instant::now());
        app.update(0, Instant::now());

        assert!(recorder.0.borrow().is_empty());
        assert_eq!(app.game().score, 0);
    }
}
