//! Gravity grid shared by the evaluator and the searches.
//!
//! Row 0 is the top of the board; discs fall towards row `rows - 1`.
use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{GameError, TypedMove};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Length of a winning line and of every scored window.
pub const SEGMENT: usize = 4;

/// Horizontal, vertical, diagonal up-right and diagonal down-right steps.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (-1, 1), (1, 1)];

/// Coordinates of one in-bounds run of [`SEGMENT`] cells.
pub type Window = [(usize, usize); SEGMENT];

/// Every window of the standard board, computed once.
static STANDARD_WINDOWS: Lazy<Vec<Window>> = Lazy::new(|| generate_windows(ROWS, COLS));

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Letter used in move-history notation and board dumps.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Cell {
    Empty,
    Disc(Player),
}

impl Cell {
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Disc(player) => Some(player),
        }
    }
}

/// A connection-game grid. Cloning yields a fully independent snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    heights: Vec<usize>,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Empty 6x7 board.
    pub fn standard() -> Self {
        Self::blank(ROWS, COLS)
    }

    pub fn new(rows: usize, cols: usize) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions { rows, cols });
        }
        Ok(Self::blank(rows, cols))
    }

    fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
            heights: vec![0; cols],
        }
    }

    /// Replays typed moves on a standard board. Turn order is not enforced.
    pub fn from_history(moves: &[TypedMove]) -> Result<Self, GameError> {
        let mut board = Self::standard();
        for mv in moves {
            board.place(mv.player, mv.column)?;
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        (row < self.rows && col < self.cols).then(|| self.cell(row, col))
    }

    pub(crate) fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// True iff `col` exists and its top cell is still empty.
    pub fn placeable(&self, col: usize) -> bool {
        col < self.cols && self.heights[col] < self.rows
    }

    /// Drops `player`'s disc into `col` and returns the row it landed in.
    pub fn place(&mut self, player: Player, col: usize) -> Result<usize, GameError> {
        if col >= self.cols {
            return Err(GameError::ColumnOutOfBounds { column: col });
        }
        if !self.placeable(col) {
            return Err(GameError::ColumnFull { column: col });
        }
        let row = self.rows - 1 - self.heights[col];
        self.cells[row * self.cols + col] = Cell::Disc(player);
        self.heights[col] += 1;
        Ok(row)
    }

    /// Cells of row `row`, left to right.
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> Vec<Cell> {
        self.cells[row * self.cols..(row + 1) * self.cols].to_vec()
    }

    /// Cells of column `col`, top to bottom.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    pub fn col(&self, col: usize) -> Vec<Cell> {
        assert!(col < self.cols, "column {col} out of bounds");
        (0..self.rows).map(|row| self.cell(row, col)).collect()
    }

    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.cols).filter(|&col| self.placeable(col)).collect()
    }

    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| !self.placeable(col))
    }

    /// Owner of a completed line, if any.
    pub fn winner(&self) -> Option<Player> {
        self.windows().iter().find_map(|window| {
            let first = self.cell(window[0].0, window[0].1).player()?;
            window[1..]
                .iter()
                .all(|&(row, col)| self.cell(row, col) == Cell::Disc(first))
                .then_some(first)
        })
    }

    pub fn terminal(&self) -> bool {
        self.is_full() || self.winner().is_some()
    }

    /// All in-bounds windows of this board's dimensions.
    pub fn windows(&self) -> Cow<'static, [Window]> {
        if (self.rows, self.cols) == (ROWS, COLS) {
            Cow::Borrowed(STANDARD_WINDOWS.as_slice())
        } else {
            Cow::Owned(generate_windows(self.rows, self.cols))
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = self
                .row(row)
                .into_iter()
                .map(|cell| cell.player().map_or('.', Player::symbol))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// A step that leaves the grid acts as the out-of-bounds sentinel: the window
// it belongs to is dropped instead of wrapping to the next line.
fn step(
    rows: usize,
    cols: usize,
    origin: (usize, usize),
    delta: (isize, isize),
) -> Option<(usize, usize)> {
    let row = origin.0.checked_add_signed(delta.0)?;
    let col = origin.1.checked_add_signed(delta.1)?;
    (row < rows && col < cols).then_some((row, col))
}

fn generate_windows(rows: usize, cols: usize) -> Vec<Window> {
    let mut windows = Vec::new();
    for (dr, dc) in DIRECTIONS {
        for row in 0..rows {
            for col in 0..cols {
                let mut window = [(0, 0); SEGMENT];
                let in_bounds = (0..SEGMENT).all(|offset| {
                    let k = offset as isize;
                    match step(rows, cols, (row, col), (dr * k, dc * k)) {
                        Some(cell) => {
                            window[offset] = cell;
                            true
                        }
                        None => false,
                    }
                });
                if in_bounds {
                    windows.push(window);
                }
            }
        }
    }
    windows
}
