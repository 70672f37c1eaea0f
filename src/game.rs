use tracing::{debug, info};

use crate::board::{Board, CellState, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::command::Command;
use crate::piece::{Piece, PieceProvider, RandomPieceProvider, Rotation};

// ============================================================================
// Configuration
// ============================================================================

// Timing (in milliseconds)
pub const DROP_INTERVAL_MS: u64 = 1000;
pub const MOVE_INTERVAL_MS: u64 = 200;
pub const DEVICE_MOVE_INTERVAL_MS: u64 = 10;

// Scoring
pub const LINE_SCORE: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub drop_interval_ms: u64,
    pub move_interval_ms: u64,
    /// Repeat interval used right after a serial-device command.
    pub device_move_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            drop_interval_ms: DROP_INTERVAL_MS,
            move_interval_ms: MOVE_INTERVAL_MS,
            device_move_interval_ms: DEVICE_MOVE_INTERVAL_MS,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Menu,
    Playing,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Started,
    PieceLocked,
    /// One per row removed by a sweep.
    LineCleared,
    /// A fresh piece collided on spawn; the board was wiped.
    GameOver { score: u32 },
    NewBestScore(u32),
    Restarted,
}

/// Directional keys currently held down.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SweepResult {
    pub rows: u32,
    pub points: u32,
}

// ============================================================================
// Collision / Transforms / Sweep
// ============================================================================

/// True if any filled cell of `piece` is off the sides, below the floor, or on
/// an occupied cell. Rows above the top edge are not checked.
pub fn collides(board: &Board, piece: &Piece) -> bool {
    let width = board.width() as i16;
    let height = board.height() as i16;
    piece.cells().any(|(x, y, _)| {
        if x < 0 || x >= width || y >= height {
            return true;
        }
        y >= 0 && board.get(x, y).is_some_and(|cell| cell.is_filled())
    })
}

/// Shifts the piece, rolling back if the new spot collides.
pub fn try_move(piece: &mut Piece, board: &Board, dx: i16, dy: i16) -> bool {
    piece.position.x += dx;
    piece.position.y += dy;
    if collides(board, piece) {
        piece.position.x -= dx;
        piece.position.y -= dy;
        return false;
    }
    true
}

/// Rotates, then searches horizontal offsets +1, -2, +3, ... until the piece
/// fits. Gives up once the offset exceeds the matrix width and restores the
/// original orientation and column.
pub fn rotate_with_kick(piece: &mut Piece, board: &Board, rotation: Rotation) -> bool {
    let original_x = piece.position.x;
    let limit = piece.size() as i16;
    let mut offset: i16 = 1;

    piece.rotate(rotation);
    while collides(board, piece) {
        piece.position.x += offset;
        offset = -(offset + offset.signum());
        if offset.abs() > limit {
            piece.rotate(rotation.reversed());
            piece.position.x = original_x;
            return false;
        }
    }
    true
}

/// Removes full rows scanning upwards. Row 0 is never cleared. Each row in the
/// same sweep is worth twice the previous one (10, 20, 40, ...).
pub fn sweep(board: &mut Board) -> SweepResult {
    let mut result = SweepResult::default();
    let mut chain: u32 = 1;
    let mut y = board.height() - 1;

    while y > 0 {
        if board.is_row_full(y) {
            board.remove_row(y);
            result.rows += 1;
            result.points = result
                .points
                .saturating_add(chain.saturating_mul(LINE_SCORE));
            chain = chain.saturating_mul(2);
            // Re-check the same index: the row above just shifted into it.
            continue;
        }
        y -= 1;
    }

    result
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub current_piece: Option<Piece>,
    pub score: u32,
    pub best_score: u32,
    pub state: GameState,
    config: GameConfig,
    drop_counter: u64,
    move_counter: u64,
    move_interval: u64,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig, best_score: u32) -> Self {
        Self::with_provider(config, best_score, Box::new(RandomPieceProvider))
    }

    /// A game sitting on the menu. No piece until [`Game::start`].
    pub fn with_provider(
        config: GameConfig,
        best_score: u32,
        provider: Box<dyn PieceProvider>,
    ) -> Self {
        Self {
            board: Board::new(config.width, config.height),
            current_piece: None,
            score: 0,
            best_score,
            state: GameState::Menu,
            config,
            drop_counter: 0,
            move_counter: 0,
            move_interval: config.move_interval_ms,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// A game already in play with the given board and piece.
    pub fn with_board(board: Board, piece: Piece) -> Self {
        let config = GameConfig {
            width: board.width(),
            height: board.height(),
            ..GameConfig::default()
        };
        let mut game = Self::new(config, 0);
        game.board = board;
        game.current_piece = Some(piece);
        game.state = GameState::Playing;
        game
    }

    pub fn with_piece_provider(mut self, provider: Box<dyn PieceProvider>) -> Self {
        self.piece_provider = provider;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn drop_counter(&self) -> u64 {
        self.drop_counter
    }

    pub fn move_counter(&self) -> u64 {
        self.move_counter
    }

    pub fn move_interval(&self) -> u64 {
        self.move_interval
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn start(&mut self) {
        if self.state != GameState::Menu {
            return;
        }
        self.state = GameState::Playing;
        self.drop_counter = 0;
        self.move_counter = 0;
        self.spawn_next_piece();
        self.events.push(GameEvent::Started);
        info!(best = self.best_score, "game started");
    }

    pub fn apply(&mut self, command: Command) {
        match (self.state, command) {
            (GameState::Menu, Command::Start) => self.start(),
            (GameState::Menu, _) | (GameState::Playing, Command::Start) => {}
            (GameState::Playing, Command::MoveLeft) => {
                self.move_piece(-1);
            }
            (GameState::Playing, Command::MoveRight) => {
                self.move_piece(1);
            }
            (GameState::Playing, Command::SoftDrop) => self.soft_drop(),
            (GameState::Playing, Command::HardDrop) => self.hard_drop(),
            (GameState::Playing, Command::RotateCw) => {
                self.rotate_piece(Rotation::Clockwise);
            }
            (GameState::Playing, Command::RotateCcw) => {
                self.rotate_piece(Rotation::CounterClockwise);
            }
            (GameState::Playing, Command::Reset) => self.restart(),
        }
    }

    /// Like [`Game::apply`], and shortens the horizontal repeat until it next fires.
    pub fn apply_device_command(&mut self, command: Command) {
        self.apply(command);
        self.move_interval = self.config.device_move_interval_ms;
    }

    pub fn move_piece(&mut self, dx: i16) -> bool {
        if !self.is_playing() {
            return false;
        }
        match self.current_piece.as_mut() {
            Some(piece) => try_move(piece, &self.board, dx, 0),
            None => false,
        }
    }

    pub fn rotate_piece(&mut self, rotation: Rotation) -> bool {
        if !self.is_playing() {
            return false;
        }
        match self.current_piece.as_mut() {
            Some(piece) => rotate_with_kick(piece, &self.board, rotation),
            None => false,
        }
    }

    pub fn soft_drop(&mut self) {
        if !self.is_playing() {
            return;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return;
        };
        if !try_move(piece, &self.board, 0, 1) {
            self.lock_in();
        }
        self.drop_counter = 0;
    }

    pub fn hard_drop(&mut self) {
        if !self.is_playing() {
            return;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return;
        };
        while try_move(piece, &self.board, 0, 1) {}
        self.lock_in();
        self.drop_counter = 0;
    }

    /// Clears the board and score, keeps the best score, deals a new piece.
    pub fn restart(&mut self) {
        self.board.clear();
        self.score = 0;
        self.spawn_next_piece();
        self.events.push(GameEvent::Restarted);
        info!("board reset");
    }

    /// Advances both timers by `delta_ms` and fires horizontal repeat and gravity.
    pub fn tick(&mut self, delta_ms: u64, held: HeldKeys) {
        if !self.is_playing() {
            return;
        }

        self.drop_counter = self.drop_counter.saturating_add(delta_ms);
        self.move_counter = self.move_counter.saturating_add(delta_ms);

        if self.move_counter > self.move_interval {
            if held.left {
                self.move_piece(-1);
            }
            if held.right {
                self.move_piece(1);
            }
            self.move_counter = 0;
            self.move_interval = self.config.move_interval_ms;
        }

        if self.drop_counter > self.config.drop_interval_ms {
            self.soft_drop();
        }
    }

    fn lock_in(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        self.board.merge(&piece);
        debug!(
            piece = %piece.kind,
            x = piece.position.x,
            y = piece.position.y,
            "piece locked"
        );

        self.spawn_next_piece();

        let swept = sweep(&mut self.board);
        if swept.rows > 0 {
            self.score = self.score.saturating_add(swept.points);
            for _ in 0..swept.rows {
                self.events.push(GameEvent::LineCleared);
            }
            debug!(rows = swept.rows, points = swept.points, score = self.score, "rows cleared");
        }

        self.events.push(GameEvent::PieceLocked);
    }

    fn spawn_next_piece(&mut self) {
        let kind = self.piece_provider.next_piece();
        let piece = Piece::spawn(kind, self.board.width());
        let blocked = collides(&self.board, &piece);
        self.current_piece = Some(piece);
        if blocked {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        let final_score = self.score;
        self.board.clear();
        if final_score > self.best_score {
            self.best_score = final_score;
            self.events.push(GameEvent::NewBestScore(final_score));
        }
        self.score = 0;
        self.events.push(GameEvent::GameOver { score: final_score });
        info!(score = final_score, best = self.best_score, "game over, board cleared");
    }

    /// The board with the current piece drawn on top.
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual_grid = self.board.rows().to_vec();

        if let Some(piece) = &self.current_piece {
            for (x, y, cell) in piece.cells() {
                if x >= 0 && y >= 0 {
                    if let Some(slot) = visual_grid
                        .get_mut(y as usize)
                        .and_then(|row| row.get_mut(x as usize))
                    {
                        *slot = cell;
                    }
                }
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default(), 0)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::piece::TetrominoType;

    pub fn empty_board() -> Board {
        Board::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.width() {
            board.set(x as i16, y as i16, CellState::Filled(TetrominoType::I));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..board.width() {
            if x != gap_x {
                board.set(x as i16, y as i16, CellState::Filled(TetrominoType::I));
            }
        }
    }
}
