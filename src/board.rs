use crate::piece::{Piece, TetrominoType};

pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    pub fn is_filled(&self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

/// The arena: a fixed grid of settled cells. Row 0 is the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<CellState>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            rows: vec![vec![CellState::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(CellState::Empty);
        }
    }

    /// Cell at column `x`, row `y`. Out of range is `None`.
    pub fn get(&self, x: i16, y: i16) -> Option<CellState> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize)?.get(x as usize).copied()
    }

    /// Writes column `x`, row `y`. Out of range is ignored.
    pub fn set(&mut self, x: i16, y: i16, cell: CellState) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(slot) = self
            .rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *slot = cell;
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(CellState::is_filled))
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows
            .get(y)
            .map_or(0, |row| row.iter().filter(|cell| cell.is_filled()).count())
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Writes the piece's filled cells into the grid. Cells above the top edge are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        for (x, y, cell) in piece.cells() {
            self.set(x, y, cell);
        }
    }

    /// Drops row `y` and pushes a fresh empty row in at the top.
    pub(crate) fn remove_row(&mut self, y: usize) {
        if y < self.height {
            self.rows.remove(y);
            self.rows.insert(0, vec![CellState::Empty; self.width]);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
