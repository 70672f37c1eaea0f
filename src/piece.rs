use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::board::CellState;
use crate::error::GameError;

// ============================================================================
// Shapes
// ============================================================================

const I_SHAPE: &[&[u8]] = &[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]];
const L_SHAPE: &[&[u8]] = &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]];
const J_SHAPE: &[&[u8]] = &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]];
const O_SHAPE: &[&[u8]] = &[&[1, 1], &[1, 1]];
const Z_SHAPE: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]];
const S_SHAPE: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]];
const T_SHAPE: &[&[u8]] = &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]];

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    L,
    J,
    O,
    Z,
    S,
    T,
}

impl TetrominoType {
    /// Draw order used by the random factory.
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::J,
        TetrominoType::L,
        TetrominoType::O,
        TetrominoType::S,
        TetrominoType::T,
        TetrominoType::Z,
    ];

    pub fn from_tag(tag: char) -> Result<Self, GameError> {
        match tag {
            'I' => Ok(TetrominoType::I),
            'L' => Ok(TetrominoType::L),
            'J' => Ok(TetrominoType::J),
            'O' => Ok(TetrominoType::O),
            'Z' => Ok(TetrominoType::Z),
            'S' => Ok(TetrominoType::S),
            'T' => Ok(TetrominoType::T),
            other => Err(GameError::InvalidPieceType(other)),
        }
    }

    pub fn tag(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::L => 'L',
            TetrominoType::J => 'J',
            TetrominoType::O => 'O',
            TetrominoType::Z => 'Z',
            TetrominoType::S => 'S',
            TetrominoType::T => 'T',
        }
    }

    /// Colour id baked into the piece's cells (1..=7).
    pub fn color_id(&self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::L => 2,
            TetrominoType::J => 3,
            TetrominoType::O => 4,
            TetrominoType::Z => 5,
            TetrominoType::S => 6,
            TetrominoType::T => 7,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            TetrominoType::I => (0xFF, 0x0D, 0x72),
            TetrominoType::L => (0x0D, 0xC2, 0xFF),
            TetrominoType::J => (0x0D, 0xFF, 0x72),
            TetrominoType::O => (0xF5, 0x38, 0xFF),
            TetrominoType::Z => (0xFF, 0x8E, 0x0D),
            TetrominoType::S => (0xFF, 0xE1, 0x38),
            TetrominoType::T => (0x38, 0x77, 0xFF),
        }
    }

    fn shape(&self) -> &'static [&'static [u8]] {
        match self {
            TetrominoType::I => I_SHAPE,
            TetrominoType::L => L_SHAPE,
            TetrominoType::J => J_SHAPE,
            TetrominoType::O => O_SHAPE,
            TetrominoType::Z => Z_SHAPE,
            TetrominoType::S => S_SHAPE,
            TetrominoType::T => T_SHAPE,
        }
    }

    /// Uniform pick over the seven types. Repeats are possible.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl FromStr for TetrominoType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(tag), None) => Self::from_tag(tag),
            (Some(tag), Some(_)) => Err(GameError::InvalidPieceType(tag)),
            (None, _) => Err(GameError::InvalidPieceType(' ')),
        }
    }
}

impl fmt::Display for TetrominoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn reversed(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

// ============================================================================
// Piece
// ============================================================================

/// The active tetromino: a square cell matrix and the board position of its top-left corner.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: TetrominoType,
    pub matrix: Vec<Vec<CellState>>,
    pub position: Position,
}

impl Piece {
    pub fn new(kind: TetrominoType) -> Self {
        Self::new_at(kind, 0, 0)
    }

    pub fn new_at(kind: TetrominoType, x: i16, y: i16) -> Self {
        let matrix = kind
            .shape()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v == 0 { CellState::Empty } else { CellState::Filled(kind) })
                    .collect()
            })
            .collect();
        Self {
            kind,
            matrix,
            position: Position { x, y },
        }
    }

    /// Top row, horizontally centred on a board of `board_width` columns.
    pub fn spawn(kind: TetrominoType, board_width: usize) -> Self {
        let mut piece = Self::new(kind);
        piece.position.x = (board_width / 2) as i16 - (piece.size() / 2) as i16;
        piece
    }

    /// Side length of the matrix.
    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    /// Absolute `(x, y, cell)` for each filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16, CellState)> + '_ {
        let Position { x: px, y: py } = self.position;
        self.matrix.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_filled())
                .map(move |(x, &cell)| (px + x as i16, py + y as i16, cell))
        })
    }

    /// In-place quarter turn: transpose, then mirror.
    pub fn rotate(&mut self, rotation: Rotation) {
        let n = self.matrix.len();
        for y in 0..n {
            for x in 0..y {
                let cell = self.matrix[y][x];
                self.matrix[y][x] = self.matrix[x][y];
                self.matrix[x][y] = cell;
            }
        }
        match rotation {
            Rotation::Clockwise => self.matrix.iter_mut().for_each(|row| row.reverse()),
            Rotation::CounterClockwise => self.matrix.reverse(),
        }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

#[derive(Debug, Default)]
pub struct RandomPieceProvider;

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::random()
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        if self.pieces.is_empty() {
            return TetrominoType::random();
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
